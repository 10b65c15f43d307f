//! Utilities for *entities* in ECS.

use std::fmt;

/// Unique identifier of the *entity* of ECS.
///
/// Identifiers are handed out in increasing order and never reused
/// during one simulation run. Value `0` is reserved for [`Entity::NULL`].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Entity which does not exist and never will.
    pub const NULL: Self = Self(0);

    /// Creates entity from its raw identifier.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier of the entity.
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is the [null](Entity::NULL) entity.
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component which links an entity to its parent in the entity tree.
///
/// Recursive removal requests follow these links downwards.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentEntity(pub Entity);

/// Allocator of monotonically increasing entity identifiers.
#[derive(Debug)]
pub(crate) struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            next: Entity::NULL.0 + 1,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        entity
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_monotonic() {
        let mut allocator = EntityAllocator::new();
        let first = allocator.allocate();
        let second = allocator.allocate();

        assert!(!first.is_null());
        assert!(first < second);
        assert_eq!(second.id(), first.id() + 1);
    }

    #[test]
    fn test_null() {
        assert!(Entity::NULL.is_null());
        assert!(Entity::default().is_null());
        assert!(!Entity::from_raw(7).is_null());
    }
}
