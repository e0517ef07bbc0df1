use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct PendingValue<V> {
    value: V,
    quiet_deadline: Instant,
}

/// Per-key quiet-period timers. Each `schedule` replaces the pending value
/// for its key and restarts that key's quiet window; other keys are
/// unaffected. Time is always passed in, so callers can drive it from a real
/// or a virtual clock.
#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    quiet: Duration,
    pending: BTreeMap<K, PendingValue<V>>,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, key: K, value: V, now: Instant) {
        self.pending.insert(
            key,
            PendingValue {
                value,
                quiet_deadline: now + self.quiet,
            },
        );
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .values()
            .map(|pending| pending.quiet_deadline)
            .min()
    }

    /// Removes and returns every value whose quiet window has elapsed.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.quiet_deadline <= now)
            .map(|(key, _)| key.clone())
            .collect::<Vec<K>>();
        due.into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|pending| (key, pending.value))
            })
            .collect()
    }
}
