//! Utilities for engine error handling.

use thiserror::Error;

use gantry_ecs::EcmError;

use crate::config::ConfigError;
use crate::system::ConfigureError;
use crate::transport::TransportError;

/// Result of any operation which can return an error.
pub type Result<T> = std::result::Result<T, Error>;

/// General error type of the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("system configuration error: {0}")]
    Configure(#[from] ConfigureError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("entity-component manager error: {0}")]
    Ecm(#[from] EcmError),
}
