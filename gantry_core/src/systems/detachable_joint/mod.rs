//! System which attaches a link of another model to a link of its own
//! model, and detaches it again on request.
//!
//! Parameters of the `plugin` element:
//!
//! * `parent_link` (required): link of the owning model.
//! * `child_model` (required): model to attach; [`SELF_MODEL`] means the owning model.
//! * `child_link` (required): link of the child model.
//! * `topic`: where detach requests are received, defaults to
//!   `/model/<model name>/detachable_joint/detach`.
//! * `suppress_child_warning`: do not warn while the child model is missing.
//!
//! Publishing [`Empty`] on the topic removes the joint during the next
//! pre-update phase.
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gantry_ecs::{Entity, EntityComponentManager, Filter};

use crate::components::{self, DetachableJoint as JointComponent, Link, Name, ParentEntity};
use crate::config::Element;
use crate::event::EventManager;
use crate::model::Model;
use crate::system::{ConfigureError, System, SystemConfigure, SystemPreUpdate, UpdateInfo};
use crate::transport::{valid_topic, Empty, Node, Subscription};

/// Value of `child_model` which refers to the model owning the system.
pub const SELF_MODEL: &str = "__model__";

/// Kind of joint created between the links.
pub const JOINT_TYPE: &str = "fixed";

pub struct DetachableJoint {
    node: Node,
    model: Model,
    parent_link: Entity,
    child_model_name: String,
    child_link_name: String,
    topic: String,
    suppress_child_warning: bool,
    valid_config: bool,
    initialized: bool,
    child_link: Entity,
    joint: Entity,
    /// Written by the transport worker, read by the tick loop.
    detach_requested: Arc<AtomicBool>,
    subscription: Option<Subscription>,
}

impl DetachableJoint {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            model: Model::new(Entity::NULL),
            parent_link: Entity::NULL,
            child_model_name: String::new(),
            child_link_name: String::new(),
            topic: String::new(),
            suppress_child_warning: false,
            valid_config: false,
            initialized: false,
            child_link: Entity::NULL,
            joint: Entity::NULL,
            detach_requested: Arc::new(AtomicBool::new(false)),
            subscription: None,
        }
    }

    /// Returns `true` if configuration succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid_config
    }

    /// Returns `true` once the joint was created.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Entity of the joint, or [`Entity::NULL`] if there is no joint.
    pub fn joint_entity(&self) -> Entity {
        self.joint
    }

    /// Topic on which detach requests are received.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn required(element: &Element, name: &'static str) -> Result<String, ConfigureError> {
        element
            .get::<String>(name)
            .ok_or(ConfigureError::MissingParameter(name))
    }

    fn resolve_child_model(&self, ecm: &EntityComponentManager) -> Entity {
        if self.child_model_name == SELF_MODEL {
            return self.model.entity();
        }
        ecm.entity_by_components(&[
            Filter::has::<components::Model>(),
            Filter::eq(Name::new(self.child_model_name.as_str())),
        ])
    }

    fn try_attach(&mut self, ecm: &mut EntityComponentManager) {
        let child_model = self.resolve_child_model(ecm);
        if child_model.is_null() {
            if !self.suppress_child_warning {
                log::warn!("child model {} could not be found", self.child_model_name);
            }
            return;
        }

        self.child_link = ecm.entity_by_components(&[
            Filter::has::<Link>(),
            Filter::eq(ParentEntity(child_model)),
            Filter::eq(Name::new(self.child_link_name.as_str())),
        ]);
        if self.child_link.is_null() {
            log::warn!("child link {} could not be found", self.child_link_name);
            return;
        }

        let flag = Arc::clone(&self.detach_requested);
        let subscription = self.node.subscribe(&self.topic, move |_: &Empty| {
            flag.store(true, Ordering::Release);
        });
        match subscription {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(error) => {
                log::error!("detachable joint cannot subscribe to [{}]: {}", self.topic, error);
                self.valid_config = false;
                return;
            }
        }
        log::info!("detachable joint subscribing to messages on [{}]", self.topic);

        self.joint = ecm.create_entity();
        let joint = JointComponent::new(self.parent_link, self.child_link, JOINT_TYPE);
        if let Err(error) = ecm.create_component(self.joint, joint) {
            log::error!("cannot create detachable joint: {}", error);
        }
        self.initialized = true;
    }
}

impl System for DetachableJoint {
    fn as_configure(&mut self) -> Option<&mut dyn SystemConfigure> {
        Some(self)
    }

    fn as_pre_update(&mut self) -> Option<&mut dyn SystemPreUpdate> {
        Some(self)
    }
}

impl SystemConfigure for DetachableJoint {
    fn configure(
        &mut self,
        entity: Entity,
        element: &Element,
        ecm: &mut EntityComponentManager,
        _events: &mut EventManager,
    ) -> Result<(), ConfigureError> {
        self.model = Model::new(entity);
        if !self.model.valid(ecm) {
            return Err(ConfigureError::NotAModel(entity));
        }
        let model_name = self.model.name(ecm).to_string();

        let parent_link_name = Self::required(element, "parent_link")?;
        self.parent_link = self.model.link_by_name(ecm, &parent_link_name);
        if self.parent_link.is_null() {
            return Err(ConfigureError::LinkNotFound {
                link: parent_link_name,
                model: model_name,
            });
        }
        self.child_model_name = Self::required(element, "child_model")?;
        self.child_link_name = Self::required(element, "child_link")?;

        let mut topics: Vec<String> = element.get("topic").into_iter().collect();
        topics.push(format!("/model/{}/detachable_joint/detach", model_name));
        self.topic = valid_topic(&topics).ok_or(ConfigureError::InvalidTopic(topics))?;

        self.suppress_child_warning = element
            .get_or("suppress_child_warning", self.suppress_child_warning)
            .0;

        self.valid_config = true;
        Ok(())
    }
}

impl SystemPreUpdate for DetachableJoint {
    fn pre_update(&mut self, _info: &UpdateInfo, ecm: &mut EntityComponentManager) {
        if self.valid_config && !self.initialized {
            self.try_attach(ecm);
        }

        if self.initialized
            && self.detach_requested.load(Ordering::Acquire)
            && !self.joint.is_null()
        {
            log::debug!("removing entity: {}", self.joint);
            ecm.request_remove_entity(self.joint, true);
            self.joint = Entity::NULL;
            self.detach_requested.store(false, Ordering::Release);
        }
    }
}
