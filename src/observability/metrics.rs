//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all operational counters
///
/// Relaxed ordering throughout; counters are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Fragment files parsed
    fragments_loaded: AtomicU64,
    /// Directory entries that were not fragments
    fragments_skipped: AtomicU64,
    /// Entries added to the index
    entries_loaded: AtomicU64,
    /// Queries answered
    queries_executed: AtomicU64,
    /// Requests that could not be answered
    queries_rejected: AtomicU64,
    /// Entries returned across all queries
    matches_returned: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Load metrics

    /// Record one parsed fragment and the entries it contributed
    pub fn record_fragment(&self, entries: u64) {
        self.fragments_loaded.fetch_add(1, Ordering::Relaxed);
        self.entries_loaded.fetch_add(entries, Ordering::Relaxed);
    }

    /// Increment skipped directory entries
    pub fn increment_fragments_skipped(&self) {
        self.fragments_skipped.fetch_add(1, Ordering::Relaxed);
    }

    // Query metrics

    /// Record one answered query and its match count
    pub fn record_query(&self, matches: u64) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        self.matches_returned.fetch_add(matches, Ordering::Relaxed);
    }

    /// Increment rejected requests
    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fragments_loaded: self.fragments_loaded.load(Ordering::Relaxed),
            fragments_skipped: self.fragments_skipped.load(Ordering::Relaxed),
            entries_loaded: self.entries_loaded.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            matches_returned: self.matches_returned.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub fragments_loaded: u64,
    pub fragments_skipped: u64,
    pub entries_loaded: u64,
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub matches_returned: u64,
}
