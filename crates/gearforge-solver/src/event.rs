//! Event system for search monitoring.
//!
//! Listeners registered on a [`GearSearch`](crate::GearSearch) receive
//! notifications about the search lifecycle. All listener methods are called
//! on the thread that drives the search, never on worker threads.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use gearforge_solver::event::{CountingSearchListener, SearchEventSupport};
//!
//! let listener = Arc::new(CountingSearchListener::new());
//! let mut support = SearchEventSupport::new();
//! support.add_listener(listener.clone());
//!
//! support.fire_search_started(1_000, 4);
//! assert_eq!(listener.search_started_count(), 1);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::orchestrator::SearchResult;
use crate::partition::Partition;
use crate::stats::WorkerStats;

/// Aggregate progress across all workers at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchProgress {
    pub checked: u64,
    pub sp_feasible: u64,
    pub accepted: u64,
    /// Best score seen by any worker so far.
    pub best_score: Option<f64>,
    pub elapsed: Duration,
}

/// Listener for search lifecycle events.
pub trait SearchListener: Send + Sync + Debug {
    /// Called once the snapshot is built, before any leaf is evaluated.
    ///
    /// `workers` is 0 for a cooperative search.
    fn on_search_started(&self, _candidate_count: u128, _workers: usize) {}

    /// Called periodically while searching.
    fn on_progress(&self, _progress: &SearchProgress) {}

    /// Called when a partition has been searched to completion or stopped.
    fn on_partition_finished(&self, _partition: Option<&Partition>, _stats: &WorkerStats) {}

    /// Called once with the final result.
    fn on_search_ended(&self, _result: &SearchResult) {}
}

/// Central broadcaster for search events.
///
/// Listeners are called synchronously in registration order.
#[derive(Default)]
pub struct SearchEventSupport {
    listeners: Vec<Arc<dyn SearchListener>>,
}

impl SearchEventSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SearchListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn fire_search_started(&self, candidate_count: u128, workers: usize) {
        for listener in &self.listeners {
            listener.on_search_started(candidate_count, workers);
        }
    }

    pub fn fire_progress(&self, progress: &SearchProgress) {
        for listener in &self.listeners {
            listener.on_progress(progress);
        }
    }

    pub fn fire_partition_finished(&self, partition: Option<&Partition>, stats: &WorkerStats) {
        for listener in &self.listeners {
            listener.on_partition_finished(partition, stats);
        }
    }

    pub fn fire_search_ended(&self, result: &SearchResult) {
        for listener in &self.listeners {
            listener.on_search_ended(result);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Debug for SearchEventSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEventSupport")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A listener that logs every event through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingSearchListener {
    prefix: String,
}

impl LoggingSearchListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging listener whose messages start with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SearchListener for LoggingSearchListener {
    fn on_search_started(&self, candidate_count: u128, workers: usize) {
        info!(
            "{}Search started over {} candidates with {} workers",
            self.prefix, candidate_count, workers
        );
    }

    fn on_progress(&self, progress: &SearchProgress) {
        info!(
            "{}Checked {} candidates, {} feasible, best {:?}",
            self.prefix, progress.checked, progress.sp_feasible, progress.best_score
        );
    }

    fn on_partition_finished(&self, partition: Option<&Partition>, stats: &WorkerStats) {
        info!(
            "{}Partition {:?} finished after {} candidates",
            self.prefix, partition, stats.checked
        );
    }

    fn on_search_ended(&self, result: &SearchResult) {
        info!(
            "{}Search ended: {:?} with {} results",
            self.prefix,
            result.outcome,
            result.top.len()
        );
    }
}

/// A listener that counts event occurrences.
#[derive(Debug, Default)]
pub struct CountingSearchListener {
    search_started_count: AtomicUsize,
    progress_count: AtomicUsize,
    partition_finished_count: AtomicUsize,
    search_ended_count: AtomicUsize,
}

impl CountingSearchListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_started_count(&self) -> usize {
        self.search_started_count.load(Ordering::SeqCst)
    }

    pub fn progress_count(&self) -> usize {
        self.progress_count.load(Ordering::SeqCst)
    }

    pub fn partition_finished_count(&self) -> usize {
        self.partition_finished_count.load(Ordering::SeqCst)
    }

    pub fn search_ended_count(&self) -> usize {
        self.search_ended_count.load(Ordering::SeqCst)
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.search_started_count.store(0, Ordering::SeqCst);
        self.progress_count.store(0, Ordering::SeqCst);
        self.partition_finished_count.store(0, Ordering::SeqCst);
        self.search_ended_count.store(0, Ordering::SeqCst);
    }
}

impl SearchListener for CountingSearchListener {
    fn on_search_started(&self, _candidate_count: u128, _workers: usize) {
        self.search_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_progress(&self, _progress: &SearchProgress) {
        self.progress_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_partition_finished(&self, _partition: Option<&Partition>, _stats: &WorkerStats) {
        self.partition_finished_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_search_ended(&self, _result: &SearchResult) {
        self.search_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
