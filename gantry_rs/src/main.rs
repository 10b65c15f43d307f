//! Demo runner of the gantry simulation runtime.
//!
//! Builds a scene with a robot arm holding a cargo box, lets it run for a
//! while, then asks the detachable joint to release the cargo.

use std::error::Error;
use std::fs;

use gantry_core::components::{Link, Model, Name, ParentEntity, Pose, World};
use gantry_core::config::{Config, Element};
use gantry_core::ecs::{Entity, EntityComponentManager};
use gantry_core::event::LoadPlugins;
use gantry_core::mirror::MirrorView;
use gantry_core::transport::Empty;

mod logger;

const APP_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");
const APP_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");

const DEFAULT_CONFIG: &str = include_str!("../assets/config.toml");
const ARM_PLUGINS: &str = include_str!("../assets/scene.toml");

const ARM: &str = "arm";

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Entry point of `gantry_rs` demo runner.
///
/// Optional first argument is a path to TOML configuration of the simulation.
///
fn main() -> Result<(), BoxError> {
    let _handle = logger::init()?;
    log::info!("logger initialized successfully");
    log::info!("{} v{}", APP_NAME, APP_VERSION_STR);

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_toml_str(&fs::read_to_string(path)?)?,
        None => Config::from_toml_str(DEFAULT_CONFIG)?,
    };
    let mut simulation = gantry_core::init(config)?;

    let view = MirrorView::new();
    let _connections = view.connect(simulation.events_mut());

    let arm = build_scene(simulation.ecm_mut())?;
    let plugins: toml::Table = toml::from_str(ARM_PLUGINS)?;
    let element = Element::from_toml("model", &toml::Value::Table(plugins));
    simulation.events().emit::<LoadPlugins>(&(arm, element));

    let ticks = simulation.run(None);
    log::info!("arm is holding the cargo after {} ticks", ticks);
    for (entity, mirrored) in view.snapshot() {
        log::info!("  {} {:?} (parent {})", entity, mirrored.name, mirrored.parent);
    }

    let topic = format!("/model/{}/detachable_joint/detach", ARM);
    simulation.node().publish(&topic, Empty)?;
    simulation.transport().flush();
    let ticks = simulation.run(Some(10));
    log::info!("cargo released, {} more ticks done", ticks);
    log::info!(
        "{} entities mirrored at {:?} of simulated time",
        view.len(),
        simulation.info().sim_time,
    );
    Ok(())
}

/// Creates the world with the `arm` and `cargo` models, returns the arm.
fn build_scene(ecm: &mut EntityComponentManager) -> Result<Entity, BoxError> {
    let world = ecm.create_entity();
    ecm.create_component(world, World)?;
    ecm.create_component(world, Name::new("default"))?;

    let arm = spawn(ecm, world, ARM)?;
    ecm.create_component(arm, Model)?;
    let gripper = spawn(ecm, arm, "gripper")?;
    ecm.create_component(gripper, Link)?;

    let cargo = spawn(ecm, world, "cargo")?;
    ecm.create_component(cargo, Model)?;
    let body = spawn(ecm, cargo, "body")?;
    ecm.create_component(body, Link)?;

    Ok(arm)
}

fn spawn(ecm: &mut EntityComponentManager, parent: Entity, name: &str) -> Result<Entity, BoxError> {
    let entity = ecm.create_entity();
    ecm.create_component(entity, Name::new(name))?;
    ecm.create_component(entity, ParentEntity(parent))?;
    ecm.create_component(entity, Pose::default())?;
    Ok(entity)
}
