//! Registry of named system constructors.

use std::collections::HashMap;
use std::fmt;

use super::System;
use crate::systems::DetachableJoint;
use crate::transport::Node;

type Constructor = Box<dyn Fn(&Node) -> Box<dyn System> + Send + Sync>;

/// Creates systems by name, as requested by `plugin` elements.
#[derive(Default)]
pub struct SystemFactory {
    constructors: HashMap<String, Constructor>,
}

impl SystemFactory {
    /// Creates empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates factory which knows every system shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut factory = Self::new();
        let detachable_joint = |node: &Node| -> Box<dyn System> {
            Box::new(DetachableJoint::new(node.clone()))
        };
        factory.register("detachable_joint", detachable_joint);
        factory.register("gantry::systems::DetachableJoint", detachable_joint);
        factory
    }

    /// Registers constructor under the name, replacing previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Node) -> Box<dyn System> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Returns `true` if there is a constructor with the name.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Creates new system instance, or `None` if the name is unknown.
    pub fn create(&self, name: &str, node: &Node) -> Option<Box<dyn System>> {
        self.constructors.get(name).map(|constructor| constructor(node))
    }
}

impl fmt::Debug for SystemFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}
