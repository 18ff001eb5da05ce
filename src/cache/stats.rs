//! Cache Statistics Module
//!
//! Tracks store activity: lookups, writes and revision conflicts.

use serde::Serialize;

// == Cache Stats ==
/// Tracks persistent cache activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a record (fresh or stale)
    pub hits: u64,
    /// Lookups for ids with no record
    pub misses: u64,
    /// Successful creates and replaces
    pub writes: u64,
    /// Writes rejected for a stale revision
    pub conflicts: u64,
    /// Current number of records in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_conflict(&mut self) {
        self.conflicts += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
