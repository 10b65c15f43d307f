//! Utilities for *components* in ECS.

use std::any::Any;

use slotmap::new_key_type;

pub use registry::*;
pub use storage::*;

mod registry;
mod storage;
mod tests;

/// Objects of this trait represent *component* of ECS.
///
/// Any thread-safe `'static` type can be attached to an entity.
///
pub trait Component: Any + Send + Sync {}

impl<T> Component for T where T: Any + Send + Sync {}

new_key_type! {
    /// Unique identifier of the *component* slot inside of its storage.
    struct ComponentID;
}
