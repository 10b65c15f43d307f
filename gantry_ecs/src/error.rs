//! Error types of entity-component manager.

use thiserror::Error;

use crate::Entity;

/// Result of entity-component manager operations.
pub type Result<T> = std::result::Result<T, EcmError>;

/// Error that can happen when operating on entities and their components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EcmError {
    #[error("entity {0} does not exist")]
    NoSuchEntity(Entity),

    #[error("null entity cannot own components")]
    NullEntity,
}
