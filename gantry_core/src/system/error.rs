//! Error types of system configuration.

use thiserror::Error;

use gantry_ecs::{EcmError, Entity};

/// Error that can happen when configuring a system.
#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("'{0}' is a required parameter")]
    MissingParameter(&'static str),

    #[error("entity {0} is not a model")]
    NotAModel(Entity),

    #[error("link with name {link} not found in model {model}")]
    LinkNotFound { link: String, model: String },

    #[error("no valid topic among {0:?}")]
    InvalidTopic(Vec<String>),

    #[error("entity-component manager failure: {0}")]
    Ecm(#[from] EcmError),
}
