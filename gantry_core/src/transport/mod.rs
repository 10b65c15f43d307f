//! In-process publish/subscribe transport for requests coming from outside
//! of the simulation loop.
//!
//! Messages are delivered on a dedicated worker thread, never on the thread
//! which runs the simulation. Subscribers must therefore only record the
//! request (set a flag, enqueue data) and let their system act on it during
//! its next scheduled phase.
//!

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use thiserror::Error;

pub use topic::{as_valid_topic, valid_topic};

mod topic;

/// Error that can happen when using [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid topic name [{0}]")]
    InvalidTopic(String),

    #[error("transport worker has stopped")]
    Closed,

    #[error("failed to spawn transport worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Objects of this trait can be sent through the transport.
pub trait Message: Any + Send + Sync {}

impl<T> Message for T where T: Any + Send + Sync {}

/// Message without payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<String, Vec<(u64, Callback)>>,
}

enum Command {
    Deliver {
        topic: String,
        message: Arc<dyn Any + Send + Sync>,
    },
    Flush(Sender<()>),
    Shutdown,
}

/// Owner of the delivery worker thread.
///
/// Dropping the transport stops the worker after it has delivered
/// every message published before.
///
pub struct Transport {
    node: Node,
    worker: Option<JoinHandle<()>>,
}

impl Transport {
    /// Starts the delivery worker.
    ///
    /// # Errors
    ///
    /// An error is returned if the worker thread cannot be spawned.
    ///
    pub fn new() -> Result<Self, TransportError> {
        let (sender, receiver) = unbounded();
        let registry = Arc::new(Mutex::new(Registry::default()));

        let worker_registry = Arc::clone(&registry);
        let worker = thread::Builder::new()
            .name("transport".to_string())
            .spawn(move || deliver(receiver, worker_registry))?;

        Ok(Self {
            node: Node { sender, registry },
            worker: Some(worker),
        })
    }

    /// Handle for publishing and subscribing.
    pub fn node(&self) -> Node {
        self.node.clone()
    }

    /// Blocks until every message published before this call is delivered.
    ///
    /// Must not be called from a subscriber callback.
    ///
    pub fn flush(&self) {
        let (ack, done) = bounded(1);
        if self.node.sender.send(Command::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let _ = self.node.sender.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("transport worker panicked");
            }
        }
    }
}

fn deliver(receiver: Receiver<Command>, registry: Arc<Mutex<Registry>>) {
    for command in receiver {
        match command {
            Command::Deliver { topic, message } => {
                let callbacks: Vec<_> = registry
                    .lock()
                    .subscribers
                    .get(&topic)
                    .map(|subscribers| {
                        subscribers
                            .iter()
                            .map(|(_, callback)| Arc::clone(callback))
                            .collect()
                    })
                    .unwrap_or_default();
                log::trace!("delivering message on [{}] to {} subscribers", topic, callbacks.len());
                for callback in callbacks {
                    callback(&*message);
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
    }
}

/// Cheap handle to publish messages and create subscriptions.
#[derive(Clone)]
pub struct Node {
    sender: Sender<Command>,
    registry: Arc<Mutex<Registry>>,
}

impl Node {
    /// Subscribes to messages of type `M` on the topic.
    ///
    /// The callback runs on the transport worker thread.
    /// Messages of other types on the same topic are ignored.
    ///
    /// # Errors
    ///
    /// An error is returned if the topic name is not valid.
    ///
    pub fn subscribe<M, F>(&self, topic: &str, callback: F) -> Result<Subscription, TransportError>
    where
        M: Message,
        F: Fn(&M) + Send + Sync + 'static,
    {
        let topic = as_valid_topic(topic)
            .ok_or_else(|| TransportError::InvalidTopic(topic.to_string()))?;
        let callback: Callback = Arc::new(move |message: &dyn Any| {
            if let Some(message) = message.downcast_ref::<M>() {
                callback(message);
            }
        });

        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .entry(topic.clone())
            .or_default()
            .push((id, callback));

        Ok(Subscription {
            topic,
            id,
            registry: Arc::downgrade(&self.registry),
        })
    }

    /// Publishes message on the topic. Delivery happens asynchronously.
    ///
    /// # Errors
    ///
    /// An error is returned if the topic name is not valid
    /// or the transport has been shut down.
    ///
    pub fn publish<M>(&self, topic: &str, message: M) -> Result<(), TransportError>
    where
        M: Message,
    {
        let topic = as_valid_topic(topic)
            .ok_or_else(|| TransportError::InvalidTopic(topic.to_string()))?;
        let command = Command::Deliver {
            topic,
            message: Arc::new(message),
        };
        self.sender.send(command).map_err(|_| TransportError::Closed)
    }

    /// Number of live subscriptions on the topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let Some(topic) = as_valid_topic(topic) else {
            return 0;
        };
        self.registry
            .lock()
            .subscribers
            .get(&topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Handle of a subscription. The callback is unregistered on drop.
#[must_use = "subscription is cancelled as soon as it is dropped"]
pub struct Subscription {
    topic: String,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Normalized topic of this subscription.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        if let Some(subscribers) = registry.subscribers.get_mut(&self.topic) {
            subscribers.retain(|(id, _)| *id != self.id);
            if subscribers.is_empty() {
                registry.subscribers.remove(&self.topic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_delivery_on_worker_thread() {
        let transport = Transport::new().unwrap();
        let node = transport.node();
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&delivered);
        let _subscription = node
            .subscribe("/numbers", move |number: &u32| {
                let thread = thread::current().name().map(str::to_string);
                sink.lock().push((*number, thread));
            })
            .unwrap();

        node.publish("/numbers", 1_u32).unwrap();
        node.publish("numbers", 2_u32).unwrap();
        node.publish("/numbers", "ignored").unwrap();
        transport.flush();

        let worker = Some("transport".to_string());
        assert_eq!(*delivered.lock(), vec![(1, worker.clone()), (2, worker)]);
    }

    #[test]
    fn test_unsubscribe_on_drop() {
        let transport = Transport::new().unwrap();
        let node = transport.node();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let subscription = node
            .subscribe("/detach", move |_: &Empty| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(subscription.topic(), "/detach");
        assert_eq!(node.subscriber_count("/detach"), 1);

        node.publish("/detach", Empty).unwrap();
        transport.flush();
        drop(subscription);
        node.publish("/detach", Empty).unwrap();
        transport.flush();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(node.subscriber_count("/detach"), 0);
    }

    #[test]
    fn test_invalid_topic() {
        let transport = Transport::new().unwrap();
        let node = transport.node();
        assert!(matches!(
            node.publish("  ", Empty),
            Err(TransportError::InvalidTopic(_))
        ));
        assert!(node.subscribe("@@", |_: &Empty| ()).is_err());
    }

    #[test]
    fn test_publish_after_shutdown() {
        let transport = Transport::new().unwrap();
        let node = transport.node();
        drop(transport);
        assert!(matches!(node.publish("/late", Empty), Err(TransportError::Closed)));
    }
}
