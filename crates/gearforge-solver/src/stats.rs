//! Search statistics.
//!
//! Plain counters kept by each worker and summed by the orchestrator.

use std::ops::AddAssign;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Per-worker leaf counters.
///
/// Every evaluated leaf increments `checked` and exactly one of the
/// rejection counters or `accepted`.
///
/// # Example
///
/// ```
/// use gearforge_solver::WorkerStats;
///
/// let mut a = WorkerStats::default();
/// a.checked = 10;
/// a.sp_feasible = 4;
/// let mut b = WorkerStats::default();
/// b.checked = 5;
///
/// a += b;
/// assert_eq!(a.checked, 15);
/// assert_eq!(a.sp_feasible, 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Leaves evaluated.
    pub checked: u64,
    /// Rejected by the O(1) skill-point prefilter.
    pub prefilter_pruned: u64,
    /// Rejected by the fast `>=` threshold precheck.
    pub threshold_pruned: u64,
    /// Rejected by the exact skill-point solver.
    pub sp_infeasible: u64,
    /// Passed the exact skill-point solver.
    pub sp_feasible: u64,
    /// Rejected by the optimistic effective-health bound.
    pub ehp_pruned: u64,
    /// Rejected by the exact threshold check.
    pub thresholds_failed: u64,
    /// Rejected by the mana check.
    pub mana_pruned: u64,
    /// Passed every filter and was scored.
    pub accepted: u64,
    /// Branches cut at internal nodes by the illegal-set tracker.
    pub illegal_pruned: u64,
}

impl WorkerStats {
    /// Leaves that passed every threshold row.
    pub fn thresholds_passed(&self) -> u64 {
        self.accepted + self.mana_pruned
    }
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.checked += other.checked;
        self.prefilter_pruned += other.prefilter_pruned;
        self.threshold_pruned += other.threshold_pruned;
        self.sp_infeasible += other.sp_infeasible;
        self.sp_feasible += other.sp_feasible;
        self.ehp_pruned += other.ehp_pruned;
        self.thresholds_failed += other.thresholds_failed;
        self.mana_pruned += other.mana_pruned;
        self.accepted += other.accepted;
        self.illegal_pruned += other.illegal_pruned;
    }
}

/// Aggregated statistics of one search run.
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    pub totals: WorkerStats,
    /// Partitions dispatched, re-dispatches included.
    pub partitions_run: usize,
}

impl SearchStatistics {
    /// Marks the start of searching.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    /// Marks the end of searching; `elapsed` freezes.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn record(&mut self, stats: WorkerStats) {
        self.totals += stats;
    }

    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => e.duration_since(s),
            (Some(s), None) => s.elapsed(),
            _ => Duration::default(),
        }
    }

    /// Returns the leaves per second rate.
    pub fn leaves_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.totals.checked as f64 / secs
        } else {
            0.0
        }
    }
}
