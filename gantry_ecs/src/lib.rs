//! Entity Component System (ECS) utilities for simulation runtime.
//!
//! The central type is [`EntityComponentManager`], which owns every entity
//! and every component of the simulation and answers queries about them.
//!

pub use component::{Component, ComponentRegistry, ComponentStorage};
pub use entity::{Entity, ParentEntity};
pub use error::{EcmError, Result};
pub use manager::EntityComponentManager;
pub use query::{Filter, Query};

mod component;
mod entity;
mod error;
mod manager;
mod query;
