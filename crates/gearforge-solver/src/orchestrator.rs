//! Search orchestration.
//!
//! [`GearSearch`] validates a request, builds the shared snapshot and then
//! either searches cooperatively on the calling thread or splits the space
//! into partitions and hands them to worker threads one at a time.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gearforge_config::SearchConfig;
use gearforge_core::Result;
use gearforge_scoring::{EquipOrderSolver, SkillPointSolver};

use crate::event::{SearchEventSupport, SearchListener, SearchProgress};
use crate::message::{WorkItem, WorkerCommand, WorkerEvent};
use crate::partition::plan_partitions;
use crate::snapshot::{SearchRequest, SearchSnapshot};
use crate::stats::{SearchStatistics, WorkerStats};
use crate::termination::search_termination;
use crate::top_k::{CandidateResult, TopK};
use crate::worker::{worker_loop, WorkerEngine, WorkerSetup};

/// How long the orchestrator waits for an event before checking for dead
/// worker threads.
const LIVENESS_POLL: Duration = Duration::from_millis(200);

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one build passed every filter.
    Found,
    /// Some builds had feasible skill points but none met the thresholds.
    NoBuildsMetThresholds,
    /// No build could satisfy its skill-point requirements.
    SpInfeasible,
    /// Stopped before the space was exhausted; `top` holds partial results.
    Cancelled,
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SearchOutcome::Found => "found",
            SearchOutcome::NoBuildsMetThresholds => "no builds met thresholds",
            SearchOutcome::SpInfeasible => "no build has feasible skill points",
            SearchOutcome::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Final result of one search run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub top: TopK,
    pub statistics: SearchStatistics,
    /// Work items that failed twice and were never searched.
    pub lost_partitions: Vec<WorkItem>,
    pub candidate_count: u128,
    /// Worker threads used; 0 for a cooperative search.
    pub workers: usize,
}

impl SearchResult {
    pub fn best(&self) -> Option<&CandidateResult> {
        self.top.best()
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == SearchOutcome::Cancelled
    }

    /// True if every candidate was examined.
    pub fn is_exhaustive(&self) -> bool {
        !self.is_cancelled() && self.lost_partitions.is_empty()
    }
}

fn classify(stopped_early: bool, top: &TopK, totals: &WorkerStats) -> SearchOutcome {
    if stopped_early {
        SearchOutcome::Cancelled
    } else if !top.is_empty() {
        SearchOutcome::Found
    } else if totals.sp_feasible > 0 || totals.threshold_pruned > 0 {
        SearchOutcome::NoBuildsMetThresholds
    } else {
        SearchOutcome::SpInfeasible
    }
}

/// Runs loadout searches.
///
/// # Example
///
/// ```
/// use gearforge_config::{SearchConfig, ThreadCount};
/// use gearforge_solver::GearSearch;
///
/// let search = GearSearch::new(SearchConfig::new().with_thread_count(ThreadCount::None));
/// let cancel = search.cancel_handle();
/// assert!(!cancel.load(std::sync::atomic::Ordering::SeqCst));
/// ```
#[derive(Debug)]
pub struct GearSearch {
    config: SearchConfig,
    events: SearchEventSupport,
    cancel: Arc<AtomicBool>,
    solver: Arc<dyn SkillPointSolver>,
}

impl Default for GearSearch {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl GearSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            events: SearchEventSupport::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            solver: Arc::new(EquipOrderSolver::new()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn SearchListener>) -> Self {
        self.events.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SearchListener>) {
        self.events.add_listener(listener);
    }

    /// Replaces the default [`EquipOrderSolver`].
    pub fn with_solver(mut self, solver: Arc<dyn SkillPointSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Shared flag that stops a running search when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Runs a search in the mode the configured thread count selects.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `request` before any worker starts.
    pub fn run(&self, request: &SearchRequest) -> Result<SearchResult> {
        match self.config.thread_count.resolve() {
            None => self.run_cooperative(request, |_| ControlFlow::Continue(())),
            Some(workers) => {
                self.cancel.store(false, Ordering::SeqCst);
                let snapshot = Arc::new(SearchSnapshot::build(request, &self.config)?);
                Ok(self.search_parallel(snapshot, workers))
            }
        }
    }

    /// Searches on the calling thread, calling `yield_fn` every
    /// `yield_interval` leaves. Returning `Break` cancels the search.
    pub fn run_cooperative<F>(&self, request: &SearchRequest, mut yield_fn: F) -> Result<SearchResult>
    where
        F: FnMut(&SearchProgress) -> ControlFlow<()>,
    {
        self.cancel.store(false, Ordering::SeqCst);
        let snapshot = SearchSnapshot::build(request, &self.config)?;
        let candidate_count = snapshot.candidate_count();

        let mut statistics = SearchStatistics::default();
        statistics.start();
        let started = Instant::now();
        info!(
            event = "search_start",
            mode = "cooperative",
            candidate_count = %candidate_count,
        );
        self.events.fire_search_started(candidate_count, 0);

        let events = &self.events;
        let mut engine = WorkerEngine::new(
            &snapshot,
            Arc::clone(&self.solver),
            search_termination(Arc::clone(&self.cancel), &self.config),
            started,
            self.config.yield_interval,
            |stats: &WorkerStats, top: &TopK| {
                let progress = SearchProgress {
                    checked: stats.checked,
                    sp_feasible: stats.sp_feasible,
                    accepted: stats.accepted,
                    best_score: top.best().map(|c| c.score),
                    elapsed: started.elapsed(),
                };
                debug!(
                    event = "progress",
                    checked = progress.checked,
                    sp_feasible = progress.sp_feasible,
                    best_score = ?progress.best_score,
                );
                events.fire_progress(&progress);
                yield_fn(&progress)
            },
        );
        let report = engine.run(None);

        statistics.record(report.stats);
        statistics.partitions_run = 1;
        statistics.finish();
        self.events.fire_partition_finished(None, &report.stats);

        let result = SearchResult {
            outcome: classify(!report.completed, &report.top, &statistics.totals),
            top: report.top,
            statistics,
            lost_partitions: Vec::new(),
            candidate_count,
            workers: 0,
        };
        self.finish(&result);
        Ok(result)
    }

    fn search_parallel(&self, snapshot: Arc<SearchSnapshot>, requested: usize) -> SearchResult {
        let candidate_count = snapshot.candidate_count();
        let partition_target = requested.saturating_mul(self.config.partitions_per_worker.max(1));
        let mut queue: VecDeque<WorkItem> = plan_partitions(&snapshot.dimensions(None), partition_target)
            .into_iter()
            .map(Some)
            .collect();
        if queue.is_empty() {
            queue.push_back(None);
        }
        let workers = requested.min(queue.len()).max(1);

        let mut statistics = SearchStatistics::default();
        statistics.start();
        let started = Instant::now();
        info!(
            event = "search_start",
            mode = "parallel",
            candidate_count = %candidate_count,
            workers = workers,
            partitions = queue.len(),
        );
        self.events.fire_search_started(candidate_count, workers);

        let mut top = TopK::new();
        let mut lost = Vec::new();
        let mut stopped_early = false;

        thread::scope(|scope| {
            let (event_tx, event_rx) = unbounded::<WorkerEvent>();
            let mut commands: Vec<Sender<WorkerCommand>> = Vec::with_capacity(workers);
            let mut handles = Vec::with_capacity(workers);
            for worker_id in 0..workers {
                let (command_tx, command_rx) = unbounded();
                let setup = WorkerSetup {
                    worker_id,
                    solver: Arc::clone(&self.solver),
                    config: self.config.clone(),
                    cancel: Arc::clone(&self.cancel),
                    started,
                };
                let events = event_tx.clone();
                handles.push(scope.spawn(move || worker_loop(setup, command_rx, events)));
                let _ = command_tx.send(WorkerCommand::Init {
                    snapshot: Arc::clone(&snapshot),
                });
                commands.push(command_tx);
            }
            drop(event_tx);

            let mut dispatch = DispatchState::new(workers);
            dispatch.fill(&commands, &mut queue, &mut statistics);

            while dispatch.has_active() {
                let event = match event_rx.recv_timeout(LIVENESS_POLL) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        for (worker_id, handle) in handles.iter().enumerate() {
                            if handle.is_finished() {
                                if let Some(work) = dispatch.kill(worker_id) {
                                    warn!(event = "worker_lost", worker_id = worker_id, partition = ?work);
                                    dispatch.requeue(work, &mut queue, &mut lost);
                                }
                            }
                        }
                        if !stopped_early {
                            dispatch.fill(&commands, &mut queue, &mut statistics);
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                };

                match event {
                    WorkerEvent::Progress {
                        worker_id,
                        stats,
                        best_score,
                        ..
                    } => {
                        dispatch.in_flight[worker_id] = stats;
                        let mut running = statistics.totals;
                        for s in &dispatch.in_flight {
                            running += *s;
                        }
                        let best = match (top.best().map(|c| c.score), best_score) {
                            (Some(a), Some(b)) => Some(a.max(b)),
                            (a, b) => a.or(b),
                        };
                        let progress = SearchProgress {
                            checked: running.checked,
                            sp_feasible: running.sp_feasible,
                            accepted: running.accepted,
                            best_score: best,
                            elapsed: started.elapsed(),
                        };
                        debug!(
                            event = "progress",
                            worker_id = worker_id,
                            checked = progress.checked,
                            sp_feasible = progress.sp_feasible,
                            best_score = ?progress.best_score,
                        );
                        self.events.fire_progress(&progress);
                    }
                    WorkerEvent::Done {
                        worker_id,
                        work,
                        stats,
                        top: partial,
                        completed,
                    } => {
                        dispatch.release(worker_id);
                        statistics.record(stats);
                        top.merge(partial);
                        self.events.fire_partition_finished(work.as_ref(), &stats);
                        if !completed && !stopped_early {
                            stopped_early = true;
                            self.cancel.store(true, Ordering::SeqCst);
                        }
                    }
                    WorkerEvent::Failed {
                        worker_id,
                        work,
                        message,
                    } => {
                        warn!(
                            event = "worker_failed",
                            worker_id = worker_id,
                            partition = ?work,
                            message = %message,
                        );
                        dispatch.release(worker_id);
                        dispatch.requeue(work, &mut queue, &mut lost);
                    }
                }

                if !stopped_early {
                    dispatch.fill(&commands, &mut queue, &mut statistics);
                }
            }

            if !stopped_early {
                // Only reachable with work left when every worker died.
                lost.extend(queue.drain(..));
            }
            for command in &commands {
                let _ = command.send(WorkerCommand::Shutdown);
            }
        });
        statistics.finish();

        let result = SearchResult {
            outcome: classify(stopped_early, &top, &statistics.totals),
            top,
            statistics,
            lost_partitions: lost,
            candidate_count,
            workers,
        };
        self.finish(&result);
        result
    }

    fn finish(&self, result: &SearchResult) {
        let elapsed = result.statistics.elapsed();
        info!(
            event = "search_end",
            outcome = %result.outcome,
            checked = result.statistics.totals.checked,
            sp_feasible = result.statistics.totals.sp_feasible,
            accepted = result.statistics.totals.accepted,
            best_score = ?result.best().map(|c| c.score),
            lost_partitions = result.lost_partitions.len(),
            duration_ms = elapsed.as_millis() as u64,
            speed = result.statistics.leaves_per_second() as u64,
        );
        self.events.fire_search_ended(result);
    }
}

/// Orchestrator-side view of the workers.
#[derive(Debug)]
struct DispatchState {
    assigned: Vec<Option<WorkItem>>,
    alive: Vec<bool>,
    in_flight: Vec<WorkerStats>,
    retried: HashSet<WorkItem>,
}

impl DispatchState {
    fn new(workers: usize) -> Self {
        Self {
            assigned: vec![None; workers],
            alive: vec![true; workers],
            in_flight: vec![WorkerStats::default(); workers],
            retried: HashSet::new(),
        }
    }

    fn has_active(&self) -> bool {
        self.assigned.iter().any(Option::is_some)
    }

    /// Sends queued work to every idle live worker.
    fn fill(
        &mut self,
        commands: &[Sender<WorkerCommand>],
        queue: &mut VecDeque<WorkItem>,
        statistics: &mut SearchStatistics,
    ) {
        for (worker_id, command) in commands.iter().enumerate() {
            if !self.alive[worker_id] || self.assigned[worker_id].is_some() {
                continue;
            }
            let Some(work) = queue.pop_front() else {
                return;
            };
            if command.send(WorkerCommand::Run(work)).is_ok() {
                self.assigned[worker_id] = Some(work);
                statistics.partitions_run += 1;
            } else {
                self.alive[worker_id] = false;
                queue.push_front(work);
            }
        }
    }

    fn release(&mut self, worker_id: usize) {
        self.assigned[worker_id] = None;
        self.in_flight[worker_id] = WorkerStats::default();
    }

    /// Marks a worker dead and returns the work it held.
    fn kill(&mut self, worker_id: usize) -> Option<WorkItem> {
        if !self.alive[worker_id] {
            return None;
        }
        self.alive[worker_id] = false;
        self.in_flight[worker_id] = WorkerStats::default();
        self.assigned[worker_id].take()
    }

    /// Re-queues `work` once; a second failure records it as lost.
    fn requeue(&mut self, work: WorkItem, queue: &mut VecDeque<WorkItem>, lost: &mut Vec<WorkItem>) {
        if self.retried.insert(work) {
            queue.push_front(work);
        } else {
            lost.push(work);
        }
    }
}

#[cfg(test)]
mod tests;
