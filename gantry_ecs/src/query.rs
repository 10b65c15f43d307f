//! Utilities for querying entities by their components.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::{Component, ComponentRegistry, Entity};

/// Set of component types requested together from an entity.
///
/// Implemented for tuples of up to 8 [components](Component).
/// An entity matches the query only when it has every listed component.
///
pub trait Query: 'static {
    /// References to the components of one matching entity.
    type Item<'a>;

    /// Fetches components of the entity, or `None` if any of them is missing.
    fn fetch(registry: &ComponentRegistry, entity: Entity) -> Option<Self::Item<'_>>;
}

macro_rules! impl_query {
    ($($name:ident),+) => {
        impl<$($name),+> Query for ($($name,)+)
        where
            $($name: Component,)+
        {
            type Item<'a> = ($(&'a $name,)+);

            fn fetch(registry: &ComponentRegistry, entity: Entity) -> Option<Self::Item<'_>> {
                Some(($(registry.get::<$name>(entity)?,)+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);
impl_query!(A, B, C, D, E, F, G);
impl_query!(A, B, C, D, E, F, G, H);

type Predicate = Box<dyn Fn(&ComponentRegistry, Entity) -> bool + Send + Sync>;

/// Single condition of [`entity_by_components`] lookups.
///
/// Either checks that a component of some type is attached to the entity,
/// or that the attached component is equal to the given value.
///
/// [`entity_by_components`]: crate::EntityComponentManager::entity_by_components
///
pub struct Filter {
    type_id: TypeId,
    type_name: &'static str,
    value: Option<Predicate>,
}

impl Filter {
    /// Matches entities which have component of type `T` attached.
    pub fn has<T>() -> Self
    where
        T: Component,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: None,
        }
    }

    /// Matches entities which have component equal to `value` attached.
    pub fn eq<T>(value: T) -> Self
    where
        T: Component + PartialEq,
    {
        let predicate = move |registry: &ComponentRegistry, entity: Entity| {
            registry.get::<T>(entity) == Some(&value)
        };
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Some(Box::new(predicate)),
        }
    }

    /// Returns `true` if the entity satisfies this filter.
    pub fn matches(&self, registry: &ComponentRegistry, entity: Entity) -> bool {
        match &self.value {
            Some(predicate) => predicate(registry, entity),
            None => registry.attached_by_id(self.type_id, entity),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("type", &self.type_name)
            .field("by_value", &self.value.is_some())
            .finish()
    }
}
