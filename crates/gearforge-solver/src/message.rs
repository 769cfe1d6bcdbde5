//! Messages between the orchestrator and its worker threads.
//!
//! Workers never share mutable state; everything they report travels back
//! as a [`WorkerEvent`] over a crossbeam channel.

use std::sync::Arc;

use crate::partition::Partition;
use crate::snapshot::SearchSnapshot;
use crate::stats::WorkerStats;
use crate::top_k::TopK;

/// A unit of work: one partition, or `None` for the whole space.
pub type WorkItem = Option<Partition>;

/// Orchestrator to worker.
///
/// Cancellation does not travel over the channel: a busy worker only reads
/// commands between runs, so it polls the shared cancel flag instead.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Hands the worker the shared snapshot; must be the first command.
    Init { snapshot: Arc<SearchSnapshot> },
    /// Search one work item.
    Run(WorkItem),
    /// Exit the worker loop.
    Shutdown,
}

/// Worker to orchestrator.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Sent every `progress_interval` leaves of a run.
    Progress {
        worker_id: usize,
        stats: WorkerStats,
        best_score: Option<f64>,
        /// Item names of the worker's current top-K, best first.
        top_items: Vec<[String; 8]>,
    },
    Done {
        worker_id: usize,
        work: WorkItem,
        stats: WorkerStats,
        top: TopK,
        completed: bool,
    },
    /// The work item panicked; its results are lost.
    Failed {
        worker_id: usize,
        work: WorkItem,
        message: String,
    },
}

impl WorkerEvent {
    pub fn worker_id(&self) -> usize {
        match self {
            WorkerEvent::Progress { worker_id, .. }
            | WorkerEvent::Done { worker_id, .. }
            | WorkerEvent::Failed { worker_id, .. } => *worker_id,
        }
    }
}
