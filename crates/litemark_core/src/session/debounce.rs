//! Per-key deadline debouncer.
//!
//! Each key owns at most one deadline. Scheduling a key again replaces its
//! deadline (last write wins), and keys never affect each other's timers.
//! The host polls with [`Debouncer::take_due`]; nothing runs in the
//! background.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    window: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadlines: HashMap::new(),
        }
    }

    /// (Re)arms `key` to fire one window after `now`.
    pub fn schedule(&mut self, key: K, now: Instant) -> Instant {
        let deadline = now + self.window;
        self.deadlines.insert(key, deadline);
        deadline
    }

    /// Drops the pending deadline for `key`; returns whether one existed.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    /// Removes and returns every key whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let due = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in &due {
            self.deadlines.remove(key);
        }
        due
    }

    /// Earliest pending deadline, for hosts that sleep until the next tick.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn rescheduling_pushes_deadline_back() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule("a", start);
        debouncer.schedule("a", start + Duration::from_millis(400));

        assert!(debouncer.take_due(start + Duration::from_millis(600)).is_empty());
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(900)),
            vec!["a"]
        );
        assert!(!debouncer.is_pending(&"a"));
    }

    #[test]
    fn keys_have_independent_timers() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);
        debouncer.schedule("b", start + Duration::from_millis(50));
        assert!(debouncer.cancel(&"a"));

        assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(150)));
        assert!(debouncer.take_due(start + Duration::from_millis(120)).is_empty());
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(150)),
            vec!["b"]
        );
    }
}
