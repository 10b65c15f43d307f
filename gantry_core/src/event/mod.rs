//! Typed publish/connect bus which decouples producers of simulation signals
//! from their consumers.
//!
//! Every event is a marker type implementing [`Event`]. Listeners are
//! connected through [`EventManager::connect`] and stay connected for as long
//! as the returned [`Connection`] is alive.
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub use events::*;

mod events;

/// Objects of this trait represent a kind of event.
pub trait Event: 'static {
    /// Arguments passed to every listener on emission.
    type Args: 'static;
}

type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Slot<A> {
    id: u64,
    connected: Arc<AtomicBool>,
    listener: Listener<A>,
}

struct Slots<A> {
    next_id: u64,
    slots: Vec<Slot<A>>,
}

/// Listener list of one event type.
struct Signal<E>
where
    E: Event,
{
    slots: Arc<Mutex<Slots<E::Args>>>,
}

impl<E> Signal<E>
where
    E: Event,
{
    fn new() -> Self {
        let slots = Slots {
            next_id: 0,
            slots: Vec::new(),
        };
        Self {
            slots: Arc::new(Mutex::new(slots)),
        }
    }

    fn connect(&self, listener: Listener<E::Args>) -> Connection {
        let connected = Arc::new(AtomicBool::new(true));
        let id = {
            let mut slots = self.slots.lock();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.slots.push(Slot {
                id,
                connected: Arc::clone(&connected),
                listener,
            });
            id
        };

        let weak: Weak<Mutex<Slots<E::Args>>> = Arc::downgrade(&self.slots);
        let detach = move || {
            if let Some(slots) = weak.upgrade() {
                slots.lock().slots.retain(|slot| slot.id != id);
            }
        };
        Connection {
            connected,
            detach: Some(Box::new(detach)),
        }
    }

    fn emit(&self, args: &E::Args) {
        // Listeners run without the lock held so they may connect or disconnect freely.
        let listeners: Vec<_> = self
            .slots
            .lock()
            .slots
            .iter()
            .map(|slot| (Arc::clone(&slot.connected), Arc::clone(&slot.listener)))
            .collect();

        for (connected, listener) in listeners {
            if connected.load(Ordering::Acquire) {
                listener(args);
            }
        }
    }

    fn len(&self) -> usize {
        self.slots.lock().slots.len()
    }
}

/// Handle of a connected listener.
///
/// Listener is disconnected when the handle is dropped
/// or [`disconnect`](Connection::disconnect) is called.
///
#[must_use = "listener is disconnected as soon as the connection is dropped"]
pub struct Connection {
    connected: Arc<AtomicBool>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Connection {
    /// Returns `true` while the listener is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Disconnects the listener right away.
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.connected.store(false, Ordering::Release);
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.release();
    }
}

/// Typed event bus of the simulation.
pub struct EventManager {
    signals: anymap2::SendSyncAnyMap,
}

impl EventManager {
    /// Creates new event manager without any listeners.
    pub fn new() -> Self {
        Self {
            signals: anymap2::SendSyncAnyMap::new(),
        }
    }

    /// Connects listener to events of type `E`.
    ///
    /// Listeners of one event type are invoked in connection order.
    ///
    pub fn connect<E, F>(&mut self, listener: F) -> Connection
    where
        E: Event,
        F: Fn(&E::Args) + Send + Sync + 'static,
    {
        self.signals
            .entry::<Signal<E>>()
            .or_insert_with(Signal::new)
            .connect(Arc::new(listener))
    }

    /// Synchronously invokes every listener of events of type `E`
    /// on the current thread.
    pub fn emit<E>(&self, args: &E::Args)
    where
        E: Event,
    {
        if let Some(signal) = self.signals.get::<Signal<E>>() {
            signal.emit(args);
        }
    }

    /// Number of listeners connected to events of type `E`.
    pub fn connection_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.signals
            .get::<Signal<E>>()
            .map(Signal::len)
            .unwrap_or(0)
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
