//! # tripwire_event - Signals
//!
//! Observer lists for notification sinks:
//! - Zero or more independent subscribers per signal
//! - Delivery in registration order
//! - Unsubscribe by [`SubscriberId`]

use std::fmt;

/// Trait for events
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Event handler function type
pub type EventHandler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// A single notification sink with any number of subscribers
pub struct Signal<E: Event> {
    handlers: Vec<(SubscriberId, EventHandler<E>)>,
    next_subscriber_id: u64,
}

impl<E: Event> Signal<E> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_subscriber_id: 1,
        }
    }

    /// Subscribe to this signal
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe, returning whether the subscriber existed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub_id, _)| *sub_id != id);
        self.handlers.len() != before
    }

    /// Deliver an event to every subscriber
    pub fn emit(&self, event: &E) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }

    /// True when nobody listens
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E: Event> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventHandler, Signal, SubscriberId};
}
