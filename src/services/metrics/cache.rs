// Metrics Cache
// Bounded memo of get_metrics results keyed by the raw threshold bits.
// Purely an optimization: cached and uncached lookups return identical records.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::models::ThresholdRecord;

use super::engine::MetricsEngine;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<u64, ThresholdRecord>,
    order: VecDeque<u64>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

#[derive(Debug)]
pub struct CachedMetrics {
    engine: MetricsEngine,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl CachedMetrics {
    /// A capacity of 0 disables caching.
    pub fn new(engine: MetricsEngine, capacity: usize) -> Self {
        Self {
            engine,
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    pub fn get_metrics(&self, threshold: f64) -> ThresholdRecord {
        if self.capacity == 0 {
            return self.engine.get_metrics(threshold);
        }

        let key = threshold.to_bits();
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(record) = state.entries.get(&key).cloned() {
            state.hits += 1;
            return record;
        }

        state.misses += 1;
        let record = self.engine.get_metrics(threshold);
        // FIFO eviction
        while state.order.len() >= self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.order.push_back(key);
        state.entries.insert(key, record.clone());
        record
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            len: state.entries.len(),
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = CacheState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_matches_engine() {
        let cache = CachedMetrics::new(MetricsEngine::default(), 8);
        for t in [0.45, 0.5, 0.53, 0.625, 0.7, 0.74] {
            assert_eq!(cache.get_metrics(t), cache.engine().get_metrics(t));
            assert_eq!(cache.get_metrics(t), cache.engine().get_metrics(t));
        }
        let stats = cache.stats();
        assert_eq!(stats.misses, 6);
        assert_eq!(stats.hits, 6);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = CachedMetrics::new(MetricsEngine::default(), 2);
        cache.get_metrics(0.51);
        cache.get_metrics(0.52);
        cache.get_metrics(0.53);
        assert_eq!(cache.stats().len, 2);
        // 0.51 was evicted first
        cache.get_metrics(0.51);
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = CachedMetrics::new(MetricsEngine::default(), 0);
        cache.get_metrics(0.6);
        cache.get_metrics(0.6);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_clear_resets_counters() {
        let cache = CachedMetrics::new(MetricsEngine::default(), 4);
        cache.get_metrics(0.6);
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
