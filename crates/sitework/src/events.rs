//! Observer registry for propagating state changes.
//!
//! [`EventBus`] is a process-local publish/subscribe registry. Listeners are
//! called synchronously, in subscription order, on the publishing thread.
//! There is no buffering and no back-pressure: an event published while no
//! one is subscribed is dropped.
//!
//! Subscribing returns a [`Subscription`]. Dropping it (or calling
//! [`Subscription::cancel`]) removes the listener.
//!
//! # Example
//!
//! ```
//! use sitework::events::EventBus;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&seen);
//! let subscription = bus.subscribe(move |n| {
//!     counter.fetch_add(*n as usize, Ordering::SeqCst);
//! });
//!
//! bus.publish(&2);
//! subscription.cancel();
//! bus.publish(&5);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

impl<E> Registry<E> {
    fn remove(&mut self, id: u64) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    // A listener that panicked leaves the list itself intact.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publish/subscribe registry for events of type `E`.
pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> EventBus<E> {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or cancelled.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            dispose: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).remove(id);
                }
            })),
        }
    }

    /// Deliver an event to every current listener.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// cancel from inside a callback. Those changes apply from the next
    /// publish.
    pub fn publish(&self, event: &E) {
        let listeners: Vec<Listener<E>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &lock(&self.registry).listeners.len())
            .finish()
    }
}

/// Handle that keeps a listener registered.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn cancel(mut self) {
        self.dispose_now();
    }

    fn dispose_now(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}
