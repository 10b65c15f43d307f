//! Read-only copy of the entity tree for consumers running
//! at a different cadence than the simulation, such as a GUI.
//!
//! The view is fed by [`AddToEcm`] and [`RemoveFromEcm`] events, so it
//! reflects the state of the ECM as of the last purge point. Poses come
//! from the [`EcmSnapshot`] of [`UpdateGuiEcm`] events and may be one tick
//! ahead of the entity set.
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use gantry_ecs::{Entity, EntityComponentManager};

use crate::components::{Name, Pose};
use crate::event::{AddToEcm, Connection, EventManager, RemoveFromEcm, UpdateGuiEcm};
use crate::system::UpdateInfo;

/// Mirrored data of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MirroredEntity {
    pub name: String,
    pub parent: Entity,
    /// Unknown until the first [`UpdateGuiEcm`] event.
    pub pose: Option<Pose>,
}

/// Copy of every named entity taken after the post-update phase.
///
/// Entities marked for removal during the tick are still included.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EcmSnapshot {
    entities: BTreeMap<Entity, MirroredEntity>,
}

impl EcmSnapshot {
    pub fn capture(ecm: &EntityComponentManager) -> Self {
        let entities = ecm
            .query::<(Name,)>()
            .map(|(entity, (name,))| {
                let mirrored = MirroredEntity {
                    name: name.as_str().to_string(),
                    parent: ecm.parent_entity(entity).unwrap_or(Entity::NULL),
                    pose: ecm.component::<Pose>(entity).copied(),
                };
                (entity, mirrored)
            })
            .collect();
        Self { entities }
    }

    pub fn get(&self, entity: Entity) -> Option<&MirroredEntity> {
        self.entities.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &MirroredEntity)> {
        self.entities.iter().map(|(&entity, mirrored)| (entity, mirrored))
    }
}

type Entities = Arc<RwLock<BTreeMap<Entity, MirroredEntity>>>;
type LastUpdate = Arc<RwLock<Option<UpdateInfo>>>;

/// Shared view of named entities of the simulation.
///
/// Cloned views share the same data.
///
#[derive(Debug, Clone, Default)]
pub struct MirrorView {
    entities: Entities,
    last_update: LastUpdate,
}

impl MirrorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts following the events. The view is updated while
    /// returned connections are alive.
    pub fn connect(&self, events: &mut EventManager) -> [Connection; 3] {
        let entities = Arc::clone(&self.entities);
        let added = events.connect::<AddToEcm, _>(
            move |(entity, name, parent): &(Entity, String, Entity)| {
                let mut entities = entities.write();
                let pose = entities.get(entity).and_then(|mirrored| mirrored.pose);
                let mirrored = MirroredEntity {
                    name: name.clone(),
                    parent: *parent,
                    pose,
                };
                entities.insert(*entity, mirrored);
            },
        );

        let entities = Arc::clone(&self.entities);
        let removed = events.connect::<RemoveFromEcm, _>(move |entity: &Entity| {
            entities.write().remove(entity);
        });

        let entities = Arc::clone(&self.entities);
        let last_update = Arc::clone(&self.last_update);
        let updated = events.connect::<UpdateGuiEcm, _>(
            move |(snapshot, info): &(Arc<EcmSnapshot>, UpdateInfo)| {
                let mut entities = entities.write();
                for (entity, mirrored) in entities.iter_mut() {
                    if let Some(current) = snapshot.get(*entity) {
                        mirrored.pose = current.pose;
                    }
                }
                *last_update.write() = Some(*info);
            },
        );

        [added, removed, updated]
    }

    /// Tick metadata of the last [`UpdateGuiEcm`] event.
    pub fn last_update(&self) -> Option<UpdateInfo> {
        *self.last_update.read()
    }

    pub fn get(&self, entity: Entity) -> Option<MirroredEntity> {
        self.entities.read().get(&entity).cloned()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.read().contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the whole view, ordered by entity.
    pub fn snapshot(&self) -> Vec<(Entity, MirroredEntity)> {
        self.entities
            .read()
            .iter()
            .map(|(&entity, mirrored)| (entity, mirrored.clone()))
            .collect()
    }

    /// Direct children of the entity, ordered by entity.
    pub fn children(&self, parent: Entity) -> Vec<Entity> {
        self.entities
            .read()
            .iter()
            .filter(|(_, mirrored)| mirrored.parent == parent)
            .map(|(&entity, _)| entity)
            .collect()
    }
}
