//! Utilities for different types of storages for **components** of ECS.

use std::any::Any;
use std::collections::HashMap;
use std::mem;
use std::ops::{Index, IndexMut};

use slotmap::{DenseSlotMap, SecondaryMap};

use super::{super::Entity, Component, ComponentID};

/// Storage for statically typed components of ECS.
pub struct ComponentStorage<T>
where
    T: Component,
{
    /// Components are actually stored here, packed for iteration.
    components: DenseSlotMap<ComponentID, T>,
    entity_to_component: HashMap<Entity, ComponentID>,
    component_to_entity: SecondaryMap<ComponentID, Entity>,
    /// Set when an entity gains or loses a component of this type.
    changed: bool,
}

impl<T> ComponentStorage<T>
where
    T: Component,
{
    /// Creates an empty component storage.
    pub fn new() -> Self {
        Self {
            components: DenseSlotMap::with_key(),
            entity_to_component: HashMap::new(),
            component_to_entity: SecondaryMap::new(),
            changed: false,
        }
    }

    /// Inserts component and attaches it to the entity.
    /// If component was already attached, it will be replaced by value.
    ///
    /// Returns previously attached component, if any.
    ///
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        if let Some(prev) = self.get_mut(entity) {
            return Some(mem::replace(prev, component));
        }
        let id = self.components.insert(component);
        self.component_to_entity.insert(id, entity);
        self.entity_to_component.insert(entity, id);
        self.changed = true;
        None
    }

    /// Removes component and detaches it from the entity.
    ///
    /// Returns component that was attached to the entity.
    ///
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let id = self.entity_to_component.remove(&entity)?;
        self.component_to_entity.remove(id);
        self.changed = true;
        self.components.remove(id)
    }

    /// Returns `true` if component was already attached to the entity.
    pub fn attached(&self, entity: Entity) -> bool {
        self.entity_to_component.contains_key(&entity)
    }

    /// Retrieves an immutable reference to component attached to the entity.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let id = *self.entity_to_component.get(&entity)?;
        self.components.get(id)
    }

    /// Retrieves a mutable reference to component attached to the entity.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let id = *self.entity_to_component.get(&entity)?;
        self.components.get_mut(id)
    }

    /// Number of components in the storage.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no entity has a component of this type.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if an entity gained or lost a component of this type
    /// since the last call to [`clear_changed`](Self::clear_changed).
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Resets the structural change flag.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Returns immutable iterator over all components with their entities.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        let component_to_entity = &self.component_to_entity;
        self.components
            .iter()
            .map(move |(id, component)| (component_to_entity[id], component))
    }

    /// Returns mutable iterator over all components with their entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let component_to_entity = &self.component_to_entity;
        self.components
            .iter_mut()
            .map(move |(id, component)| (component_to_entity[id], component))
    }

    /// Returns iterator over all entities which have component of this type.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entity_to_component.keys().copied()
    }
}

impl<T> Default for ComponentStorage<T>
where
    T: Component,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Entity> for ComponentStorage<T>
where
    T: Component,
{
    type Output = T;

    fn index(&self, entity: Entity) -> &Self::Output {
        self.get(entity)
            .expect("there is no component attached to the entity")
    }
}

impl<T> IndexMut<Entity> for ComponentStorage<T>
where
    T: Component,
{
    fn index_mut(&mut self, entity: Entity) -> &mut Self::Output {
        self.get_mut(entity)
            .expect("there is no component attached to the entity")
    }
}

/// Type-erased view of [`ComponentStorage`] used by the registry
/// to operate on every storage at once.
pub(crate) trait ErasedStorage: Send + Sync {
    fn detach(&mut self, entity: Entity) -> bool;

    fn attached(&self, entity: Entity) -> bool;

    fn changed(&self) -> bool;

    fn clear_changed(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ErasedStorage for ComponentStorage<T>
where
    T: Component,
{
    fn detach(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn attached(&self, entity: Entity) -> bool {
        ComponentStorage::attached(self, entity)
    }

    fn changed(&self) -> bool {
        self.changed
    }

    fn clear_changed(&mut self) {
        ComponentStorage::clear_changed(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
