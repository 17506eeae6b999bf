use std::collections::HashMap;
use std::hash::Hash;

/// Minimum spacing between accepted events of the same kind.
///
/// Requests inside the window are dropped, not queued, and do not extend it.
#[derive(Clone, Debug)]
pub struct Debouncer<K> {
    interval_ms: f64,
    last_accepted: HashMap<K, f64>,
}

impl<K: Eq + Hash> Debouncer<K> {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_accepted: HashMap::new(),
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn try_accept(&mut self, key: K, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            return false;
        }
        if let Some(&last) = self.last_accepted.get(&key) {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_accepted.insert(key, now_ms);
        true
    }

    /// Whether a request for `key` would be accepted right now.
    pub fn is_ready(&self, key: &K, now_ms: f64) -> bool {
        match self.last_accepted.get(key) {
            Some(&last) => now_ms - last >= self.interval_ms,
            None => now_ms.is_finite(),
        }
    }

    pub fn forget(&mut self, key: &K) {
        self.last_accepted.remove(key);
    }

    pub fn reset(&mut self) {
        self.last_accepted.clear();
    }
}
