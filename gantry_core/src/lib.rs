//! Core of a simulation engine built around an entity-component manager:
//! events, systems and their scheduling, message transport and the tick loop.

pub use gantry_ecs as ecs;

pub use app::{init, Simulation};

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod mirror;
pub mod model;
pub mod system;
pub mod systems;
pub mod transport;
