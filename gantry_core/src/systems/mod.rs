//! Systems shipped with the engine.

pub use detachable_joint::DetachableJoint;

pub mod detachable_joint;
