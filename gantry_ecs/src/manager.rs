//! Entity-component manager: owner of all entities and their components.

use std::any::type_name;
use std::collections::BTreeSet;
use std::mem;

use crate::entity::{EntityAllocator, ParentEntity};
use crate::error::{EcmError, Result};
use crate::{Component, ComponentRegistry, Entity, Filter, Query};

/// Storage for all entities and components of the simulation.
///
/// Entities are never destroyed immediately. A removal request only marks
/// the entity, which stays readable until the runner reaches the purge point
/// and calls [`process_remove_entity_requests`](Self::process_remove_entity_requests).
/// That way references taken earlier in the tick stay valid for the rest of it.
///
#[derive(Default)]
pub struct EntityComponentManager {
    allocator: EntityAllocator,
    /// All existing entities, ordered by creation.
    entities: BTreeSet<Entity>,
    /// Map with typeid of components and their storages.
    components: ComponentRegistry,
    /// Entities created since the last purge point.
    new_entities: BTreeSet<Entity>,
    /// Entities waiting for the purge point.
    to_remove: BTreeSet<Entity>,
}

impl EntityComponentManager {
    /// Creates new empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates new entity without any components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity);
        self.new_entities.insert(entity);
        log::trace!("created entity {}", entity);
        entity
    }

    /// Returns `true` if the entity exists, including entities pending removal.
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Number of existing entities, including entities pending removal.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attaches component to the entity, replacing previous value of the same type.
    ///
    /// Returns previously attached component, if any.
    ///
    /// # Errors
    ///
    /// An error is returned if the entity does not exist.
    /// Nothing is attached in that case.
    ///
    pub fn create_component<T>(&mut self, entity: Entity, component: T) -> Result<Option<T>>
    where
        T: Component,
    {
        if let Err(error) = self.check_entity(entity) {
            log::warn!("cannot attach {}: {}", type_name::<T>(), error);
            return Err(error);
        }
        Ok(self.components.insert(entity, component))
    }

    /// Detaches component of type `T` from the entity.
    ///
    /// Nonexistent entities are ignored with a warning.
    ///
    pub fn remove_component<T>(&mut self, entity: Entity) -> Option<T>
    where
        T: Component,
    {
        if let Err(error) = self.check_entity(entity) {
            log::warn!("cannot detach {}: {}", type_name::<T>(), error);
            return None;
        }
        self.components.remove(entity)
    }

    /// Retrieves an immutable reference to component attached to the entity.
    pub fn component<T>(&self, entity: Entity) -> Option<&T>
    where
        T: Component,
    {
        self.components.get(entity)
    }

    /// Retrieves a mutable reference to component attached to the entity.
    pub fn component_mut<T>(&mut self, entity: Entity) -> Option<&mut T>
    where
        T: Component,
    {
        self.components.get_mut(entity)
    }

    /// Returns `true` if component of type `T` is attached to the entity.
    pub fn entity_has_component<T>(&self, entity: Entity) -> bool
    where
        T: Component,
    {
        self.components.attached::<T>(entity)
    }

    /// Returns `true` if an entity gained or lost a component of type `T`
    /// during the current tick.
    pub fn component_type_changed<T>(&self) -> bool
    where
        T: Component,
    {
        self.components.changed::<T>()
    }

    /// Read-only access to all component storages.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns the first entity, in creation order, matching all filters.
    ///
    /// Returns [`Entity::NULL`] if there is no such entity.
    ///
    pub fn entity_by_components(&self, filters: &[Filter]) -> Entity {
        self.matching(filters).next().unwrap_or(Entity::NULL)
    }

    /// Returns all entities matching all filters, in creation order.
    pub fn entities_by_components(&self, filters: &[Filter]) -> Vec<Entity> {
        self.matching(filters).collect()
    }

    /// Returns direct children of `parent` matching all filters, in creation order.
    pub fn children_by_components(&self, parent: Entity, filters: &[Filter]) -> Vec<Entity> {
        self.matching(filters)
            .filter(|&entity| self.parent_entity(entity) == Some(parent))
            .collect()
    }

    /// Parent of the entity in the entity tree, if any.
    pub fn parent_entity(&self, entity: Entity) -> Option<Entity> {
        self.components
            .get::<ParentEntity>(entity)
            .map(|parent| parent.0)
    }

    /// Returns iterator over all entities having every component of `Q`,
    /// together with references to these components.
    pub fn query<Q>(&self) -> impl Iterator<Item = (Entity, Q::Item<'_>)> + '_
    where
        Q: Query,
    {
        Self::fetch_all::<Q>(&self.components, &self.entities)
    }

    /// Calls `callback` for every entity having every component of `Q`.
    pub fn each<'a, Q, F>(&'a self, mut callback: F)
    where
        Q: Query,
        F: FnMut(Entity, Q::Item<'a>),
    {
        for (entity, item) in self.query::<Q>() {
            callback(entity, item);
        }
    }

    /// Calls `callback` with a mutable reference to every component of type `T`.
    pub fn each_mut<T, F>(&mut self, mut callback: F)
    where
        T: Component,
        F: FnMut(Entity, &mut T),
    {
        for &entity in &self.entities {
            if let Some(component) = self.components.get_mut::<T>(entity) {
                callback(entity, component);
            }
        }
    }

    /// Same as [`each`](Self::each), restricted to entities created during the current tick.
    pub fn each_new<'a, Q, F>(&'a self, mut callback: F)
    where
        Q: Query,
        F: FnMut(Entity, Q::Item<'a>),
    {
        for (entity, item) in Self::fetch_all::<Q>(&self.components, &self.new_entities) {
            callback(entity, item);
        }
    }

    /// Same as [`each`](Self::each), restricted to entities marked for removal.
    pub fn each_removed<'a, Q, F>(&'a self, mut callback: F)
    where
        Q: Query,
        F: FnMut(Entity, Q::Item<'a>),
    {
        for (entity, item) in Self::fetch_all::<Q>(&self.components, &self.to_remove) {
            callback(entity, item);
        }
    }

    /// Returns `true` if any entity was created during the current tick.
    pub fn has_new_entities(&self) -> bool {
        !self.new_entities.is_empty()
    }

    /// Returns `true` if any entity waits for the purge point.
    pub fn has_entities_marked_for_removal(&self) -> bool {
        !self.to_remove.is_empty()
    }

    /// Returns `true` if the entity waits for the purge point.
    pub fn is_marked_for_removal(&self, entity: Entity) -> bool {
        self.to_remove.contains(&entity)
    }

    /// Marks the entity for removal at the purge point.
    ///
    /// If `recursive` is set, every descendant of the entity is marked too.
    /// Requesting removal more than once has no additional effect.
    /// Unknown entities are ignored with a warning.
    ///
    pub fn request_remove_entity(&mut self, entity: Entity, recursive: bool) {
        if let Err(error) = self.check_entity(entity) {
            log::warn!("ignoring removal request: {}", error);
            return;
        }
        if recursive {
            let descendants = self.descendants(entity);
            self.to_remove.extend(descendants);
        } else {
            self.to_remove.insert(entity);
        }
    }

    /// Marks every existing entity for removal at the purge point.
    pub fn request_remove_entities(&mut self) {
        self.to_remove.extend(self.entities.iter().copied());
    }

    /// Destroys all entities marked for removal together with their components.
    ///
    /// Must be called by the simulation runner only, between ticks.
    /// Returns destroyed entities in creation order.
    ///
    pub fn process_remove_entity_requests(&mut self) -> Vec<Entity> {
        let removed: Vec<_> = mem::take(&mut self.to_remove).into_iter().collect();
        for &entity in &removed {
            self.components.remove_all(entity);
            self.entities.remove(&entity);
            self.new_entities.remove(&entity);
            log::debug!("removed entity {}", entity);
        }
        removed
    }

    /// Forgets which entities were created during the current tick.
    pub fn clear_new_entities(&mut self) {
        self.new_entities.clear();
    }

    /// Resets structural change flags of all component types.
    pub fn clear_changed_components(&mut self) {
        self.components.clear_changed();
    }

    fn check_entity(&self, entity: Entity) -> Result<()> {
        if entity.is_null() {
            return Err(EcmError::NullEntity);
        }
        if !self.has_entity(entity) {
            return Err(EcmError::NoSuchEntity(entity));
        }
        Ok(())
    }

    fn matching<'a>(&'a self, filters: &'a [Filter]) -> impl Iterator<Item = Entity> + 'a {
        self.entities.iter().copied().filter(move |&entity| {
            filters
                .iter()
                .all(|filter| filter.matches(&self.components, entity))
        })
    }

    /// The entity itself and all entities below it in the entity tree.
    fn descendants(&self, root: Entity) -> BTreeSet<Entity> {
        let mut result = BTreeSet::new();
        let mut pending = vec![root];
        while let Some(entity) = pending.pop() {
            if !result.insert(entity) {
                continue;
            }
            if let Some(parents) = self.components.storage::<ParentEntity>() {
                pending.extend(
                    parents
                        .iter()
                        .filter(|(_, parent)| parent.0 == entity)
                        .map(|(child, _)| child),
                );
            }
        }
        result
    }

    fn fetch_all<'a, Q>(
        components: &'a ComponentRegistry,
        entities: &'a BTreeSet<Entity>,
    ) -> impl Iterator<Item = (Entity, Q::Item<'a>)> + 'a
    where
        Q: Query,
    {
        entities.iter().filter_map(move |&entity| {
            Q::fetch(components, entity).map(|item| (entity, item))
        })
    }
}
