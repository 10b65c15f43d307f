//! Lifecycle and phase scheduling of systems.

use std::fmt;

use gantry_ecs::{Entity, EntityComponentManager};

use super::{System, UpdateInfo};
use crate::config::Element;
use crate::event::EventManager;

/// Lifecycle state of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemState {
    /// Added, waiting for the next tick to be configured.
    Unconfigured,
    /// Configured, takes part in phases starting with the next one.
    Configured,
    /// Invoked in every tick.
    Active,
    /// Owner entity was destroyed; system instance is gone.
    Removed,
}

/// Phases a system implements, recorded once when it is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Phases {
    configure: bool,
    pre_update: bool,
    update: bool,
    post_update: bool,
    reset: bool,
}

impl Phases {
    fn of(system: &mut dyn System) -> Self {
        Self {
            configure: system.as_configure().is_some(),
            pre_update: system.as_pre_update().is_some(),
            update: system.as_update().is_some(),
            post_update: system.as_post_update().is_some(),
            reset: system.as_reset().is_some(),
        }
    }
}

struct Entry {
    name: String,
    owner: Entity,
    element: Element,
    state: SystemState,
    phases: Phases,
    system: Box<dyn System>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("state", &self.state)
            .field("phases", &self.phases)
            .finish()
    }
}

/// Storage of all systems, invoking them phase by phase.
///
/// Within one phase systems run in the order they were added,
/// and every system finishes a phase before any system starts the next one.
///
#[derive(Debug, Default)]
pub struct SystemManager {
    pending: Vec<Entry>,
    systems: Vec<Entry>,
}

impl SystemManager {
    /// Creates new manager without systems.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds system owned by the entity. It is configured at the start of the next tick.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        owner: Entity,
        element: Element,
        mut system: Box<dyn System>,
    ) {
        let name = name.into();
        let phases = Phases::of(system.as_mut());
        log::debug!("adding system [{}] for entity {} with {:?}", name, owner, phases);
        self.pending.push(Entry {
            name,
            owner,
            element,
            state: SystemState::Unconfigured,
            phases,
            system,
        });
    }

    /// Configures every system added since the last call.
    ///
    /// Configuration failures are logged; such systems stay registered.
    /// Returns count of newly configured systems.
    ///
    pub fn configure_pending(
        &mut self,
        ecm: &mut EntityComponentManager,
        events: &mut EventManager,
    ) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for mut entry in pending {
            if let Some(system) = entry.system.as_configure() {
                if let Err(error) = system.configure(entry.owner, &entry.element, ecm, events) {
                    log::error!(
                        "system [{}] of entity {} failed to configure: {}",
                        entry.name,
                        entry.owner,
                        error,
                    );
                }
            }
            entry.state = SystemState::Configured;
            self.systems.push(entry);
        }
        count
    }

    /// Makes every configured system active.
    pub fn activate(&mut self) {
        for entry in &mut self.systems {
            if entry.state == SystemState::Configured {
                log::trace!("system [{}] is active", entry.name);
                entry.state = SystemState::Active;
            }
        }
    }

    /// Runs [`SystemPreUpdate`](super::SystemPreUpdate) of every active system.
    pub fn pre_update(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager) {
        for entry in self.active(|phases| phases.pre_update) {
            if let Some(system) = entry.system.as_pre_update() {
                system.pre_update(info, ecm);
            }
        }
    }

    /// Runs [`SystemUpdate`](super::SystemUpdate) of every active system.
    pub fn update(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager) {
        for entry in self.active(|phases| phases.update) {
            if let Some(system) = entry.system.as_update() {
                system.update(info, ecm);
            }
        }
    }

    /// Runs [`SystemPostUpdate`](super::SystemPostUpdate) of every active system.
    pub fn post_update(&mut self, info: &UpdateInfo, ecm: &EntityComponentManager) {
        for entry in self.active(|phases| phases.post_update) {
            if let Some(system) = entry.system.as_post_update() {
                system.post_update(info, ecm);
            }
        }
    }

    /// Runs [`SystemReset`](super::SystemReset) of every active system.
    pub fn reset(&mut self, info: &UpdateInfo, ecm: &mut EntityComponentManager) {
        for entry in self.active(|phases| phases.reset) {
            if let Some(system) = entry.system.as_reset() {
                system.reset(info, ecm);
            }
        }
    }

    /// Drops every system whose owner is among `removed` entities.
    ///
    /// Returns count of dropped systems.
    ///
    pub fn remove_owned_by(&mut self, removed: &[Entity]) -> usize {
        if removed.is_empty() {
            return 0;
        }
        let before = self.pending.len() + self.systems.len();
        let keep = |entry: &Entry| {
            let owned = removed.contains(&entry.owner);
            if owned {
                log::debug!(
                    "system [{}] is {:?} with its entity {}",
                    entry.name,
                    SystemState::Removed,
                    entry.owner,
                );
            }
            !owned
        };
        self.pending.retain(keep);
        self.systems.retain(keep);
        before - self.pending.len() - self.systems.len()
    }

    /// Count of systems, including not yet configured ones.
    pub fn len(&self) -> usize {
        self.pending.len() + self.systems.len()
    }

    /// Returns `true` if there are no systems.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name, owner and state of every system, in the order they were added.
    pub fn states(&self) -> impl Iterator<Item = (&str, Entity, SystemState)> + '_ {
        self.systems
            .iter()
            .chain(&self.pending)
            .map(|entry| (entry.name.as_str(), entry.owner, entry.state))
    }

    fn active<F>(&mut self, has_phase: F) -> impl Iterator<Item = &mut Entry> + '_
    where
        F: Fn(&Phases) -> bool + 'static,
    {
        self.systems
            .iter_mut()
            .filter(move |entry| entry.state == SystemState::Active && has_phase(&entry.phases))
    }
}

#[cfg(test)]
mod tests;
