//! Utilities for managing component storages.

use std::any::TypeId;
use std::collections::HashMap;

use super::{super::Entity, Component, ComponentStorage, ErasedStorage};

/// Registry of all component storages of ECS, keyed by component type.
#[derive(Default)]
#[repr(transparent)]
pub struct ComponentRegistry {
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl ComponentRegistry {
    /// Creates new empty component registry.
    pub fn new() -> Self {
        Self {
            storages: HashMap::new(),
        }
    }

    /// Inserts component of type `T` and attaches it to the entity.
    /// If component was already attached, it will be replaced by value.
    ///
    /// Returns previously attached component, if any.
    ///
    pub fn insert<T>(&mut self, entity: Entity, component: T) -> Option<T>
    where
        T: Component,
    {
        self.storage_or_create::<T>().insert(entity, component)
    }

    /// Removes component of type `T` and detaches it from the entity.
    ///
    /// Returns component that was previously attached to the entity.
    ///
    pub fn remove<T>(&mut self, entity: Entity) -> Option<T>
    where
        T: Component,
    {
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Detaches components of every type from the entity.
    ///
    /// Returns how many components were removed.
    ///
    pub fn remove_all(&mut self, entity: Entity) -> usize {
        self.storages
            .values_mut()
            .map(|storage| storage.detach(entity))
            .filter(|&removed| removed)
            .count()
    }

    /// Returns `true` if component of type `T` was already attached to the entity.
    pub fn attached<T>(&self, entity: Entity) -> bool
    where
        T: Component,
    {
        self.attached_by_id(TypeId::of::<T>(), entity)
    }

    /// Same as [`attached`](Self::attached), with component type given at runtime.
    pub fn attached_by_id(&self, type_id: TypeId, entity: Entity) -> bool {
        self.storages
            .get(&type_id)
            .map(|storage| storage.attached(entity))
            .unwrap_or(false)
    }

    /// Retrieves an immutable reference to component of type `T` attached to the entity.
    pub fn get<T>(&self, entity: Entity) -> Option<&T>
    where
        T: Component,
    {
        self.storage::<T>()?.get(entity)
    }

    /// Retrieves a mutable reference to component of type `T` attached to the entity.
    pub fn get_mut<T>(&mut self, entity: Entity) -> Option<&mut T>
    where
        T: Component,
    {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Storage of components of type `T`, if any component of that type was ever inserted.
    pub fn storage<T>(&self) -> Option<&ComponentStorage<T>>
    where
        T: Component,
    {
        let typeid = TypeId::of::<T>();
        let boxed = self.storages.get(&typeid)?;
        boxed.as_any().downcast_ref()
    }

    /// Mutable storage of components of type `T`.
    pub fn storage_mut<T>(&mut self) -> Option<&mut ComponentStorage<T>>
    where
        T: Component,
    {
        let typeid = TypeId::of::<T>();
        let boxed = self.storages.get_mut(&typeid)?;
        boxed.as_any_mut().downcast_mut()
    }

    /// Returns `true` if storage of type `T` was structurally changed.
    pub fn changed<T>(&self) -> bool
    where
        T: Component,
    {
        self.storages
            .get(&TypeId::of::<T>())
            .map(|storage| storage.changed())
            .unwrap_or(false)
    }

    /// Resets structural change flags of all storages.
    pub fn clear_changed(&mut self) {
        self.storages
            .values_mut()
            .for_each(|storage| storage.clear_changed());
    }

    fn storage_or_create<T>(&mut self) -> &mut ComponentStorage<T>
    where
        T: Component,
    {
        let typeid = TypeId::of::<T>();
        self.storages
            .entry(typeid)
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut()
            .expect("storage registered under foreign type id")
    }
}
