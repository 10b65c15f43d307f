//! Events emitted and consumed by the simulation runner and its systems.

use std::sync::Arc;

use gantry_ecs::Entity;

use super::Event;
use crate::config::Element;
use crate::mirror::EcmSnapshot;
use crate::system::UpdateInfo;

/// Pauses simulation when emitted with `true`, resumes it with `false`.
///
/// ```
/// use gantry_core::event::{EventManager, Pause};
///
/// let events = EventManager::new();
/// events.emit::<Pause>(&true);
/// ```
pub enum Pause {}

impl Event for Pause {
    type Args = bool;
}

/// Requests termination of the simulation after the current tick.
pub enum Stop {}

impl Event for Stop {
    type Args = ();
}

/// Requests loading of systems for an entity.
///
/// The element may contain several `plugin` children, each naming
/// a registered system through its `name` attribute.
///
pub enum LoadPlugins {}

impl Event for LoadPlugins {
    type Args = (Entity, Element);
}

/// Asks the rendering side to draw a frame when it shares the process
/// with the simulation.
pub enum Render {}

impl Event for Render {
    type Args = ();
}

/// Turns sensors of the rendering side on or off.
pub enum EnableSensors {}

impl Event for EnableSensors {
    type Args = bool;
}

/// Notifies mirrored views that a named entity appeared.
///
/// Arguments are the entity, its name and its parent
/// ([`Entity::NULL`] for roots).
///
pub enum AddToEcm {}

impl Event for AddToEcm {
    type Args = (Entity, String, Entity);
}

/// Notifies mirrored views that an entity was destroyed.
pub enum RemoveFromEcm {}

impl Event for RemoveFromEcm {
    type Args = Entity;
}

/// Hands a copy of the ECM to views running at their own cadence.
///
/// Emitted once per tick after the post-update phase, only while
/// somebody listens.
///
pub enum UpdateGuiEcm {}

impl Event for UpdateGuiEcm {
    type Args = (Arc<EcmSnapshot>, UpdateInfo);
}
