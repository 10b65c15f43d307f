//! Standard component types shared by systems.
//!
//! Models own links through [`ParentEntity`]; every named entity carries a
//! [`Name`]. Systems find each other's entities by these components instead
//! of holding references to each other.
//!

use ultraviolet::{Rotor3, Vec3};

use gantry_ecs::Entity;

pub use gantry_ecs::ParentEntity;

/// Name of an entity, unique among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Marks the entity as the world, root of the entity tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct World;

/// Marks the entity as a model: a structure made of links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Model;

/// Marks the entity as a link: a rigid part of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Link;

/// Position and orientation of an entity relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Rotor3,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Rotor3) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Rotor3::identity())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::zero(), Rotor3::identity())
    }
}

/// Joint between two links which can be removed at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachableJoint {
    pub parent_link: Entity,
    pub child_link: Entity,
    /// Kind of joint, such as `"fixed"`.
    pub joint_type: String,
}

impl DetachableJoint {
    pub fn new(parent_link: Entity, child_link: Entity, joint_type: impl Into<String>) -> Self {
        Self {
            parent_link,
            child_link,
            joint_type: joint_type.into(),
        }
    }
}
