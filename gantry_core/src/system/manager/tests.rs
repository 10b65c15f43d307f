use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::system::{
    ConfigureError, SystemConfigure, SystemPostUpdate, SystemPreUpdate, SystemUpdate,
};

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every phase it takes part in.
struct Recorder {
    name: &'static str,
    journal: Journal,
    fail_configure: bool,
}

impl Recorder {
    fn boxed(name: &'static str, journal: &Journal) -> Box<dyn System> {
        Box::new(Self {
            name,
            journal: Arc::clone(journal),
            fail_configure: false,
        })
    }

    fn record(&self, phase: &str) {
        self.journal.lock().push(format!("{}:{}", self.name, phase));
    }
}

impl System for Recorder {
    fn as_configure(&mut self) -> Option<&mut dyn SystemConfigure> {
        Some(self)
    }

    fn as_pre_update(&mut self) -> Option<&mut dyn SystemPreUpdate> {
        Some(self)
    }

    fn as_update(&mut self) -> Option<&mut dyn SystemUpdate> {
        Some(self)
    }

    fn as_post_update(&mut self) -> Option<&mut dyn SystemPostUpdate> {
        Some(self)
    }
}

impl SystemConfigure for Recorder {
    fn configure(
        &mut self,
        _entity: Entity,
        _element: &Element,
        _ecm: &mut EntityComponentManager,
        _events: &mut EventManager,
    ) -> Result<(), ConfigureError> {
        self.record("configure");
        if self.fail_configure {
            return Err(ConfigureError::MissingParameter("anything"));
        }
        Ok(())
    }
}

impl SystemPreUpdate for Recorder {
    fn pre_update(&mut self, _info: &UpdateInfo, _ecm: &mut EntityComponentManager) {
        self.record("pre");
    }
}

impl SystemUpdate for Recorder {
    fn update(&mut self, _info: &UpdateInfo, _ecm: &mut EntityComponentManager) {
        self.record("update");
    }
}

impl SystemPostUpdate for Recorder {
    fn post_update(&mut self, _info: &UpdateInfo, _ecm: &EntityComponentManager) {
        self.record("post");
    }
}

/// Implements only the update phase.
struct UpdateOnly(Journal);

impl System for UpdateOnly {
    fn as_update(&mut self) -> Option<&mut dyn SystemUpdate> {
        Some(self)
    }
}

impl SystemUpdate for UpdateOnly {
    fn update(&mut self, _info: &UpdateInfo, _ecm: &mut EntityComponentManager) {
        self.0.lock().push("only:update".to_string());
    }
}

fn tick(manager: &mut SystemManager, ecm: &mut EntityComponentManager, events: &mut EventManager) {
    let info = UpdateInfo::default();
    manager.configure_pending(ecm, events);
    manager.activate();
    manager.pre_update(&info, ecm);
    manager.update(&info, ecm);
    manager.post_update(&info, ecm);
}

#[test]
fn test_phase_order() {
    let mut ecm = EntityComponentManager::new();
    let mut events = EventManager::new();
    let mut manager = SystemManager::new();
    let journal = Journal::default();
    let owner = ecm.create_entity();

    manager.add("a", owner, Element::default(), Recorder::boxed("a", &journal));
    manager.add("only", owner, Element::default(), Box::new(UpdateOnly(Arc::clone(&journal))));
    manager.add("b", owner, Element::default(), Recorder::boxed("b", &journal));
    assert!(manager.states().all(|(_, _, state)| state == SystemState::Unconfigured));

    tick(&mut manager, &mut ecm, &mut events);

    let expected = [
        "a:configure",
        "b:configure",
        "a:pre",
        "b:pre",
        "a:update",
        "only:update",
        "b:update",
        "a:post",
        "b:post",
    ];
    assert_eq!(*journal.lock(), expected);
    assert!(manager.states().all(|(_, _, state)| state == SystemState::Active));
}

#[test]
fn test_failed_configure_keeps_system() {
    let mut ecm = EntityComponentManager::new();
    let mut events = EventManager::new();
    let mut manager = SystemManager::new();
    let journal = Journal::default();
    let owner = ecm.create_entity();

    let failing = Box::new(Recorder {
        name: "failing",
        journal: Arc::clone(&journal),
        fail_configure: true,
    });
    manager.add("failing", owner, Element::default(), failing);
    tick(&mut manager, &mut ecm, &mut events);

    assert_eq!(manager.len(), 1);
    assert_eq!(journal.lock()[0], "failing:configure");
}

#[test]
fn test_systems_added_later_join_next_tick() {
    let mut ecm = EntityComponentManager::new();
    let mut events = EventManager::new();
    let mut manager = SystemManager::new();
    let journal = Journal::default();
    let owner = ecm.create_entity();

    manager.add("a", owner, Element::default(), Recorder::boxed("a", &journal));
    tick(&mut manager, &mut ecm, &mut events);
    journal.lock().clear();

    manager.add("b", owner, Element::default(), Recorder::boxed("b", &journal));
    tick(&mut manager, &mut ecm, &mut events);

    let expected = ["b:configure", "a:pre", "b:pre", "a:update", "b:update", "a:post", "b:post"];
    assert_eq!(*journal.lock(), expected);
}

#[test]
fn test_remove_owned_by() {
    let mut ecm = EntityComponentManager::new();
    let mut events = EventManager::new();
    let mut manager = SystemManager::new();
    let journal = Journal::default();
    let first = ecm.create_entity();
    let second = ecm.create_entity();

    manager.add("a", first, Element::default(), Recorder::boxed("a", &journal));
    manager.add("b", second, Element::default(), Recorder::boxed("b", &journal));
    tick(&mut manager, &mut ecm, &mut events);
    manager.add("c", first, Element::default(), Recorder::boxed("c", &journal));

    assert_eq!(manager.remove_owned_by(&[]), 0);
    assert_eq!(manager.remove_owned_by(&[first]), 2);
    let names: Vec<_> = manager.states().map(|(name, _, _)| name).collect();
    assert_eq!(names, vec!["b"]);
}
