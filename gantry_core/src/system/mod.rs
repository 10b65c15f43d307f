//! Utilities for *systems*: units of behavior driven by the simulation
//! once per tick.
//!
//! A system implements any subset of the phase traits below and exposes
//! them through the capability accessors of [`System`]. The
//! [`SystemManager`] records which phases a system has when it is added
//! and invokes only those.
//!

use std::time::Duration;

use gantry_ecs::{Entity, EntityComponentManager};

use crate::config::Element;
use crate::event::EventManager;

pub use error::ConfigureError;
pub use factory::SystemFactory;
pub use manager::{SystemManager, SystemState};

mod error;
mod factory;
mod manager;

/// Metadata of the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateInfo {
    /// Simulated time elapsed since start.
    pub sim_time: Duration,
    /// Wall clock time elapsed since start.
    pub real_time: Duration,
    /// Simulated time of this tick, zero while paused.
    pub dt: Duration,
    /// Count of unpaused ticks performed so far.
    pub iterations: u64,
    pub paused: bool,
}

/// Objects of this trait represent *system* of the simulation.
///
/// Every accessor returns `None` by default; a system overrides those
/// matching the phases it implements:
///
/// ```
/// use gantry_core::system::{System, SystemPreUpdate, UpdateInfo};
/// use gantry_ecs::EntityComponentManager;
///
/// struct Spawner;
///
/// impl System for Spawner {
///     fn as_pre_update(&mut self) -> Option<&mut dyn SystemPreUpdate> {
///         Some(self)
///     }
/// }
///
/// impl SystemPreUpdate for Spawner {
///     fn pre_update(&mut self, _info: &UpdateInfo, ecm: &mut EntityComponentManager) {
///         ecm.create_entity();
///     }
/// }
/// ```
pub trait System: Send {
    fn as_configure(&mut self) -> Option<&mut dyn SystemConfigure> {
        None
    }

    fn as_pre_update(&mut self) -> Option<&mut dyn SystemPreUpdate> {
        None
    }

    fn as_update(&mut self) -> Option<&mut dyn SystemUpdate> {
        None
    }

    fn as_post_update(&mut self) -> Option<&mut dyn SystemPostUpdate> {
        None
    }

    fn as_reset(&mut self) -> Option<&mut dyn SystemReset> {
        None
    }
}

/// One-time configuration of a system.
pub trait SystemConfigure {
    /// Configures the system owned by `entity` from its `element`.
    ///
    /// # Errors
    ///
    /// An error is returned if the element or the entity are not suitable
    /// for this system. The system stays registered but must not touch
    /// the simulation in later phases.
    ///
    fn configure(
        &mut self,
        entity: Entity,
        element: &Element,
        ecm: &mut EntityComponentManager,
        events: &mut EventManager,
    ) -> Result<(), ConfigureError>;
}

/// Phase which runs first in every tick.
pub trait SystemPreUpdate {
    fn pre_update(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager);
}

/// Phase for the main domain logic of the tick.
pub trait SystemUpdate {
    fn update(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager);
}

/// Phase which runs last in every tick and only observes the state.
pub trait SystemPostUpdate {
    fn post_update(&mut self, info: &UpdateInfo, ecm: &EntityComponentManager);
}

/// Returns the system to its just-configured state.
pub trait SystemReset {
    fn reset(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager);
}
