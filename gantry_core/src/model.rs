//! Convenience wrapper over model entities.

use gantry_ecs::{Entity, EntityComponentManager, Filter};

use crate::components::{Link, Model as ModelMarker, Name, ParentEntity};

/// Model entity together with lookups of its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    entity: Entity,
}

impl Model {
    pub const fn new(entity: Entity) -> Self {
        Self { entity }
    }

    /// Entity of this model.
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` if the entity exists and is marked as a model.
    pub fn valid(&self, ecm: &EntityComponentManager) -> bool {
        ecm.entity_has_component::<ModelMarker>(self.entity)
    }

    /// Name of the model, or empty string if it has none.
    pub fn name<'a>(&self, ecm: &'a EntityComponentManager) -> &'a str {
        ecm.component::<Name>(self.entity)
            .map(Name::as_str)
            .unwrap_or_default()
    }

    /// Direct child link with given name, or [`Entity::NULL`].
    pub fn link_by_name(&self, ecm: &EntityComponentManager, name: &str) -> Entity {
        ecm.entity_by_components(&[
            Filter::has::<Link>(),
            Filter::eq(ParentEntity(self.entity)),
            Filter::eq(Name::new(name)),
        ])
    }

    /// All direct child links of the model.
    pub fn links(&self, ecm: &EntityComponentManager) -> Vec<Entity> {
        ecm.children_by_components(self.entity, &[Filter::has::<Link>()])
    }
}
