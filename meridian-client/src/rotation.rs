//! Per-service round-robin state.
//!
//! Each service name owns one counter that only ever moves forward. A
//! selection takes the next counter value and maps it onto whatever endpoint
//! list the caller resolved for this call, so the rotation stays fair while the
//! list is stable and simply continues from the new length when it changes.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Round-robin counters keyed by service name.
#[derive(Debug, Default)]
pub struct RotationTable {
    counters: DashMap<String, Arc<AtomicU32>>,
}

impl RotationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the next endpoint for `service_name`.
    ///
    /// Returns `None` for an empty list without touching the counter.
    pub fn select_next<'a, T>(&self, service_name: &str, endpoints: &'a [T]) -> Option<&'a T> {
        if endpoints.is_empty() {
            return None;
        }

        let counter = self.counter_for(service_name);
        // fetch_add wraps on overflow; the post-increment value is previous + 1
        let value = counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = value.wrapping_sub(1) as usize % endpoints.len();

        trace!(service = %service_name, counter = value, index, "Rotation selection");
        endpoints.get(index)
    }

    /// Current counter value for a service, if it was ever selected.
    pub fn counter(&self, service_name: &str) -> Option<u32> {
        self.counters
            .get(service_name)
            .map(|c| c.load(Ordering::Relaxed))
    }

    /// Number of services with a counter.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no service has been selected yet.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn counter_for(&self, service_name: &str) -> Arc<AtomicU32> {
        if let Some(counter) = self.counters.get(service_name) {
            return Arc::clone(counter.value());
        }
        // entry() holds the shard lock, so concurrent first use agrees on one counter
        Arc::clone(
            self.counters
                .entry(service_name.to_string())
                .or_default()
                .value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn test_sequential_order() {
        let table = RotationTable::new();
        let endpoints = ["a", "b", "c"];

        let picks: Vec<&str> = (0..7)
            .map(|_| *table.select_next("api", &endpoints).unwrap())
            .collect();

        assert_eq!(picks, vec!["a", "b", "c", "a", "b", "c", "a"]);
        assert_eq!(table.counter("api"), Some(7));
    }

    #[test]
    fn test_empty_list() {
        let table = RotationTable::new();
        let endpoints: [&str; 0] = [];

        assert!(table.select_next("api", &endpoints).is_none());
        assert_eq!(table.counter("api"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_services_are_independent() {
        let table = RotationTable::new();
        let endpoints = [0, 1, 2];

        assert_eq!(table.select_next("orders", &endpoints), Some(&0));
        assert_eq!(table.select_next("orders", &endpoints), Some(&1));
        assert_eq!(table.select_next("billing", &endpoints), Some(&0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_list_length_change() {
        let table = RotationTable::new();

        assert_eq!(table.select_next("api", &[10, 11, 12]), Some(&10));
        assert_eq!(table.select_next("api", &[10, 11, 12]), Some(&11));
        // counter is now 3, so the next pick is index 2 % 2 == 0
        assert_eq!(table.select_next("api", &[10, 11]), Some(&10));
        assert_eq!(table.select_next("api", &[10, 11]), Some(&11));
    }

    #[test]
    fn test_counter_wraps() {
        let table = RotationTable::new();
        table
            .counters
            .insert("api".to_string(), Arc::new(AtomicU32::new(u32::MAX)));

        // post-increment wraps to 0, so index is u32::MAX % 2
        assert_eq!(table.select_next("api", &[0, 1]), Some(&1));
        assert_eq!(table.counter("api"), Some(0));
        assert_eq!(table.select_next("api", &[0, 1]), Some(&0));
    }

    #[test]
    fn test_concurrent_fairness() {
        const ENDPOINTS: usize = 4;
        const THREADS: usize = 8;
        const PER_THREAD: usize = 500;

        let table = RotationTable::new();
        let endpoints: Vec<usize> = (0..ENDPOINTS).collect();
        let counts = Mutex::new(HashMap::<usize, usize>::new());

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    let mut local = HashMap::new();
                    for _ in 0..PER_THREAD {
                        let picked = *table.select_next("api", &endpoints).unwrap();
                        *local.entry(picked).or_insert(0) += 1;
                    }
                    let mut counts = counts.lock().unwrap();
                    for (index, n) in local {
                        *counts.entry(index).or_insert(0) += n;
                    }
                });
            }
        });

        let counts = counts.into_inner().unwrap();
        let total = THREADS * PER_THREAD;
        for index in 0..ENDPOINTS {
            assert_eq!(counts[&index], total / ENDPOINTS);
        }
        assert_eq!(table.counter("api"), Some(total as u32));
        assert_eq!(table.len(), 1);
    }
}
