//! Bounded, insertion-ordered event store.
//!
//! A hash map from event id to record plus an explicit FIFO of ids.
//! Only insertion of a *new* key affects ordering; lookups and in-place
//! updates never move an entry.  Once a new key would push the store past
//! its capacity, the oldest-inserted key is evicted first.
//!
//! Invariant: `order` and `map` always hold the same key set and
//! `map.len() <= capacity`.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use log::trace;

/// Fixed-capacity FIFO-evicting map.
#[derive(Debug, Clone)]
pub struct RetentionStore<V> {
    map: HashMap<String, V>,
    order: VecDeque<String>,
    capacity: usize,
}

impl<V> RetentionStore<V> {
    /// Create a store holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert or replace `key`.
    ///
    /// Replacing an existing key keeps its original position.  Returns the
    /// stored value and the key evicted to make room, if any.
    pub fn insert(&mut self, key: String, value: V) -> (&mut V, Option<String>) {
        let evicted = if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        match self.map.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(value);
                (slot.into_mut(), None)
            }
            Entry::Vacant(slot) => {
                self.order.push_back(slot.key().clone());
                (slot.insert(value), evicted)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self.order.pop_front()?;
        self.map.remove(&oldest);
        trace!("retention: evicted {oldest}");
        Some(oldest)
    }
}
