//! Synchronous, ordered publish/subscribe.
//!
//! `EventBus<K>` keeps an ordered set of subscriber keys. `notify` hands the
//! event to every subscriber in subscription order, synchronously, before
//! returning. The bus stores keys rather than objects so the owner decides
//! how a key is turned into a receiver (an arena slot, a queue, ...).

use serde::{Deserialize, Serialize};

/// Something that reacts to events of type `E`.
pub trait Observer<E> {
    /// React to one event.
    fn handle(&mut self, event: &E);
}

/// Ordered subscriber registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventBus<K> {
    subscribers: Vec<K>,
}

impl<K: Copy + PartialEq> EventBus<K> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Subscribe `key`. Returns false if it was already subscribed.
    pub fn observe(&mut self, key: K) -> bool {
        if self.is_observing(key) {
            return false;
        }
        self.subscribers.push(key);
        true
    }

    /// Unsubscribe `key`. Returns false if it was not subscribed.
    pub fn unobserve(&mut self, key: K) -> bool {
        match self.subscribers.iter().position(|&k| k == key) {
            Some(pos) => {
                self.subscribers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Check if `key` is subscribed.
    #[must_use]
    pub fn is_observing(&self, key: K) -> bool {
        self.subscribers.contains(&key)
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscribers in delivery order.
    pub fn subscribers(&self) -> impl Iterator<Item = K> + '_ {
        self.subscribers.iter().copied()
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn notify<E>(&self, event: &E, mut deliver: impl FnMut(K, &E)) {
        for &key in &self.subscribers {
            deliver(key, event);
        }
    }
}

impl<K: Copy + PartialEq> Default for EventBus<K> {
    fn default() -> Self {
        Self::new()
    }
}
