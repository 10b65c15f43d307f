//! Utilities for simulation initialization and its tick loop.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use gantry_ecs::{Entity, EntityComponentManager};

use crate::components::Name;
use crate::config::{Config, Element, ENGINE_NAME, ENGINE_VERSION};
use crate::error::Result;
use crate::event::{
    AddToEcm, Connection, EventManager, LoadPlugins, Pause, RemoveFromEcm, Stop, UpdateGuiEcm,
};
use crate::mirror::EcmSnapshot;
use crate::system::{System, SystemFactory, SystemManager, UpdateInfo};
use crate::transport::{Node, Transport};

type LoadRequests = Arc<Mutex<Vec<(Entity, Element)>>>;

/// General context of the simulation.
///
/// Owns the entity-component manager, the event bus, every system
/// and the message transport. Can be created using [`init`] function.
///
pub struct Simulation {
    config: Config,
    ecm: EntityComponentManager,
    events: EventManager,
    systems: SystemManager,
    factory: SystemFactory,
    info: UpdateInfo,
    start_time: Instant,
    paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    load_requests: LoadRequests,
    _connections: [Connection; 3],
    transport: Transport,
}

impl Simulation {
    /// Creates new simulation which knows every built-in system.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_factory(config, SystemFactory::with_builtin())
    }

    /// Creates new simulation which creates systems with given factory.
    ///
    /// # Errors
    ///
    /// An error is returned if the transport worker cannot be started.
    ///
    pub fn with_factory(config: Config, factory: SystemFactory) -> Result<Self> {
        let transport = Transport::new()?;
        let mut events = EventManager::new();

        let paused = Arc::new(AtomicBool::new(config.start_paused()));
        let stop = Arc::new(AtomicBool::new(false));
        let load_requests = LoadRequests::default();

        let pause = {
            let paused = Arc::clone(&paused);
            events.connect::<Pause, _>(move |&value: &bool| {
                log::info!("simulation {}", if value { "paused" } else { "resumed" });
                paused.store(value, Ordering::Release);
            })
        };
        let stop_connection = {
            let stop = Arc::clone(&stop);
            events.connect::<Stop, _>(move |_: &()| {
                log::info!("simulation stop requested");
                stop.store(true, Ordering::Release);
            })
        };
        let load = {
            let load_requests = Arc::clone(&load_requests);
            events.connect::<LoadPlugins, _>(move |(entity, element): &(Entity, Element)| {
                load_requests.lock().push((*entity, element.clone()));
            })
        };

        log::info!(
            "{} v{}: created simulation \"{}\" v{} with step {:?}",
            ENGINE_NAME,
            *ENGINE_VERSION,
            config.name(),
            config.version(),
            config.step_size(),
        );
        Ok(Self {
            info: UpdateInfo {
                paused: config.start_paused(),
                ..UpdateInfo::default()
            },
            config,
            ecm: EntityComponentManager::new(),
            events,
            systems: SystemManager::new(),
            factory,
            start_time: Instant::now(),
            paused,
            stop,
            load_requests,
            _connections: [pause, stop_connection, load],
            transport,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ecm(&self) -> &EntityComponentManager {
        &self.ecm
    }

    /// Mutable access to the ECM, meant for building the scene between ticks.
    pub fn ecm_mut(&mut self) -> &mut EntityComponentManager {
        &mut self.ecm
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    /// Metadata of the last performed tick.
    pub fn info(&self) -> &UpdateInfo {
        &self.info
    }

    /// Node of the simulation transport, for publishing requests to systems.
    pub fn node(&self) -> Node {
        self.transport.node()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Same as emitting [`Pause`] event.
    pub fn set_paused(&self, paused: bool) {
        self.events.emit::<Pause>(&paused);
    }

    /// Returns `true` once [`Stop`] was emitted.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Adds system owned by the entity. It is configured at the start of the next tick.
    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        owner: Entity,
        element: Element,
        system: Box<dyn System>,
    ) {
        self.systems.add(name, owner, element, system);
    }

    /// Creates every system requested by `plugin` elements for the entity.
    ///
    /// `element` is either a `plugin` element itself or contains them as children.
    /// Unknown plugin names are logged and skipped.
    /// Returns count of created systems.
    ///
    pub fn load_plugins(&mut self, entity: Entity, element: &Element) -> usize {
        let plugins: Vec<&Element> = if element.name() == "plugin" {
            vec![element]
        } else {
            element.elements("plugin").collect()
        };

        let node = self.transport.node();
        let mut count = 0;
        for plugin in plugins {
            let Some(name) = plugin.attribute("name") else {
                log::error!("plugin element of entity {} has no name", entity);
                continue;
            };
            match self.factory.create(name, &node) {
                Some(system) => {
                    self.systems.add(name, entity, plugin.clone(), system);
                    count += 1;
                }
                None => log::error!("failed to load system plugin [{}]", name),
            }
        }
        count
    }

    /// Performs exactly one tick.
    pub fn step(&mut self) {
        let requests = mem::take(&mut *self.load_requests.lock());
        for (entity, element) in requests {
            self.load_plugins(entity, &element);
        }
        self.systems.configure_pending(&mut self.ecm, &mut self.events);
        self.systems.activate();

        let paused = self.is_paused();
        self.info.paused = paused;
        self.info.dt = if paused {
            Duration::ZERO
        } else {
            self.config.step_size()
        };
        self.info.real_time = self.start_time.elapsed();

        self.systems.pre_update(&self.info, &mut self.ecm);
        self.systems.update(&self.info, &mut self.ecm);
        self.systems.post_update(&self.info, &self.ecm);
        if self.events.connection_count::<UpdateGuiEcm>() > 0 {
            let snapshot = Arc::new(EcmSnapshot::capture(&self.ecm));
            self.events.emit::<UpdateGuiEcm>(&(snapshot, self.info));
        }

        self.purge();

        if !paused {
            self.info.sim_time = self.info.sim_time.saturating_add(self.info.dt);
            self.info.iterations += 1;
        }
    }

    /// Performs ticks until `iterations` ticks are done or [`Stop`] is emitted.
    ///
    /// Without explicit count the one from configuration is used;
    /// if there is none, only [`Stop`] ends the loop.
    /// Returns count of performed ticks.
    ///
    pub fn run(&mut self, iterations: Option<u64>) -> u64 {
        let limit = iterations.or(self.config.iterations());
        let mut ticks = 0;
        while limit.map_or(true, |limit| ticks < limit) && !self.is_stopped() {
            self.step();
            ticks += 1;
        }
        log::info!("simulation finished after {} ticks", ticks);
        ticks
    }

    /// Rewinds simulated time and lets every system reset its state.
    pub fn reset(&mut self) {
        log::info!("resetting simulation at {:?}", self.info.sim_time);
        self.info.sim_time = Duration::ZERO;
        self.info.iterations = 0;
        self.info.dt = Duration::ZERO;
        self.start_time = Instant::now();
        self.systems.reset(&self.info, &mut self.ecm);
    }

    /// Applies structural changes requested during the tick.
    fn purge(&mut self) {
        let removed = self.ecm.process_remove_entity_requests();
        for entity in &removed {
            self.events.emit::<RemoveFromEcm>(entity);
        }

        let ecm = &self.ecm;
        let events = &self.events;
        ecm.each_new::<(Name,), _>(|entity: Entity, (name,): (&Name,)| {
            let parent = ecm.parent_entity(entity).unwrap_or(Entity::NULL);
            events.emit::<AddToEcm>(&(entity, name.as_str().to_string(), parent));
        });

        let dropped = self.systems.remove_owned_by(&removed);
        if dropped > 0 {
            log::debug!("dropped {} systems of removed entities", dropped);
        }
        self.ecm.clear_new_entities();
        self.ecm.clear_changed_components();
    }
}

/// Creates a new [`Simulation`] instance.
///
/// # Errors
///
/// An error is returned if the transport worker cannot be started.
///
pub fn init(config: Config) -> Result<Simulation> {
    Simulation::new(config)
}
