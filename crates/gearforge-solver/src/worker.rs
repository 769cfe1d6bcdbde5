//! The per-worker search engine.
//!
//! A [`WorkerEngine`] owns all mutable search state of one worker: the running
//! stat accumulator, the illegal-set tracker, the current placements, its
//! top-K and its counters. It borrows the shared [`SearchSnapshot`] and is
//! driven by the [`LevelEnumerator`].
//!
//! Leaf pipeline, cheapest first:
//! 1. skill-point prefilter
//! 2. fast `>=` threshold precheck
//! 3. exact skill-point solver
//! 4. optimistic effective-health bound
//! 5. stat assembly and greedy spending of leftover points
//! 6. exact threshold check
//! 7. mana check
//! 8. top-K insert

use std::fmt::Debug;
use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{Receiver, Sender};
use smallvec::SmallVec;
use tracing::{info, trace, warn};

use gearforge_config::SearchConfig;

use gearforge_core::{Item, SkillPoints, Slot};
use gearforge_scoring::{
    passes_prefilter, passes_thresholds, sp_lower_bound, GreedyAllocator, Piece, SkillPointSolver,
    StatAccumulator,
};

use crate::illegal_set::IllegalSetTracker;
use crate::level::{LevelEnumerator, LevelVisitor};
use crate::message::{WorkerCommand, WorkerEvent};
use crate::partition::Partition;
use crate::snapshot::SearchSnapshot;
use crate::stats::WorkerStats;
use crate::termination::{search_termination, Termination, TerminationScope};
use crate::top_k::{CandidateResult, TopK};

/// Termination is polled once per this many enumerator polls.
const POLL_INTERVAL: u64 = 16;

/// What one run over a partition produced.
#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub stats: WorkerStats,
    pub top: TopK,
    /// False if a termination or the progress hook stopped the run.
    pub completed: bool,
}

/// Mutable search state of one worker.
///
/// `P` is called every `progress_interval` leaves with the counters and
/// top-K of the current run; returning `Break` stops the run.
pub struct WorkerEngine<'s, T, P>
where
    T: Termination,
    P: FnMut(&WorkerStats, &TopK) -> ControlFlow<()>,
{
    snapshot: &'s SearchSnapshot,
    solver: Arc<dyn SkillPointSolver>,
    termination: T,
    on_progress: P,
    progress_interval: u64,
    started: Instant,

    pools: [&'s [Item]; 8],
    placed: [Option<&'s Item>; 8],
    accumulator: StatAccumulator,
    tracker: IllegalSetTracker<'s>,

    stats: WorkerStats,
    top: TopK,
    lifetime_leaves: u64,
    polls: u64,
    stopped: bool,
}

impl<'s, T, P> Debug for WorkerEngine<'s, T, P>
where
    T: Termination,
    P: FnMut(&WorkerStats, &TopK) -> ControlFlow<()>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerEngine")
            .field("termination", &self.termination)
            .field("stats", &self.stats)
            .field("top", &self.top.len())
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl<'s, T, P> WorkerEngine<'s, T, P>
where
    T: Termination,
    P: FnMut(&WorkerStats, &TopK) -> ControlFlow<()>,
{
    /// Creates an engine with the locked items already placed.
    ///
    /// `started` is the search start all time limits are measured from.
    pub fn new(
        snapshot: &'s SearchSnapshot,
        solver: Arc<dyn SkillPointSolver>,
        termination: T,
        started: Instant,
        progress_interval: u64,
        on_progress: P,
    ) -> Self {
        let pools = Slot::ALL.map(|slot| snapshot.pools().slot(slot));
        let mut placed: [Option<&'s Item>; 8] = [None; 8];
        let mut tracker = IllegalSetTracker::new();
        for slot in Slot::ALL {
            if let Some(item) = snapshot.locked(slot) {
                placed[slot.index()] = Some(item);
                if item.illegal_at_two {
                    if let Some(set) = item.set_name.as_deref() {
                        tracker.add(set, item.name.as_str());
                    }
                }
            }
        }
        Self {
            snapshot,
            solver,
            termination,
            on_progress,
            progress_interval: progress_interval.max(1),
            started,
            pools,
            placed,
            accumulator: StatAccumulator::with_base(
                snapshot.base_stats().clone(),
                snapshot.base_skill(),
            ),
            tracker,
            stats: WorkerStats::default(),
            top: TopK::new(),
            lifetime_leaves: 0,
            polls: 0,
            stopped: false,
        }
    }

    /// Enumerates `partition` (or the whole space) in level order.
    pub fn run(&mut self, partition: Option<&Partition>) -> PartitionReport {
        self.stats = WorkerStats::default();
        self.top = TopK::new();
        self.stopped = false;

        let enumerator = LevelEnumerator::new(self.snapshot.dimensions(partition));
        let completed = enumerator.run(self) && !self.stopped;

        PartitionReport {
            stats: self.stats,
            top: std::mem::take(&mut self.top),
            completed,
        }
    }

    /// Leaves evaluated over every run of this engine.
    pub fn lifetime_leaves(&self) -> u64 {
        self.lifetime_leaves
    }

    fn placed_item(&self, slot: Slot) -> &'s Item {
        match self.placed[slot.index()] {
            Some(item) => item,
            None => &self.pools[slot.index()][0],
        }
    }

    /// Runs the filter pipeline on the current placements.
    fn evaluate(&mut self, level: usize) {
        let snapshot = self.snapshot;
        let ctx = snapshot.context();
        let budget = snapshot.budget();

        let weapon = Piece::bare(snapshot.weapon());
        let mut pieces: SmallVec<[Piece<'s>; 8]> = SmallVec::new();
        let mut max_req = weapon.item.requirements;
        let mut sets: SmallVec<[&str; 4]> = SmallVec::new();
        let mut optimistic_set = SkillPoints::ZERO;
        for slot in Slot::ALL {
            let item = self.placed_item(slot);
            let set = item.set_name.as_deref().and_then(|name| snapshot.set(name));
            if let Some(set) = set {
                if !sets.contains(&set.name.as_str()) {
                    sets.push(set.name.as_str());
                    optimistic_set += set.optimistic_skill_points();
                }
            }
            max_req = max_req.max(&item.requirements);
            pieces.push(Piece::new(item, set));
        }

        let lower = sp_lower_bound(max_req, self.accumulator.skill_bonus(), optimistic_set);
        if !passes_prefilter(&lower, budget) {
            self.stats.prefilter_pruned += 1;
            return;
        }

        let running = self.accumulator.stats();
        if !snapshot.fast_thresholds().passes(running) {
            self.stats.threshold_pruned += 1;
            return;
        }

        let Some(solution) = self
            .solver
            .solve(
                &pieces,
                weapon,
                snapshot.tome_bonus(),
                snapshot.restrictions().skill_directions,
                budget,
            )
        else {
            self.stats.sp_infeasible += 1;
            return;
        };
        self.stats.sp_feasible += 1;

        if !snapshot.ehp_bound().passes(
            running,
            &solution.assignment,
            &solution.final_totals,
            budget,
            ctx,
        ) {
            self.stats.ehp_pruned += 1;
            return;
        }

        let stage3 = ctx.assemble(running, &solution.set_counts.stat_bonus());
        let stage4 = ctx.with_static(&stage3);
        let allocation = GreedyAllocator::new(snapshot.restrictions().skill_directions, budget)
            .with_floors(snapshot.skill_floors())
            .allocate(solution.assignment, solution.final_totals, |totals| {
                ctx.objective(&stage3, &stage4, totals)
            });

        if !passes_thresholds(
            &snapshot.restrictions().thresholds,
            &stage4,
            &allocation.totals,
            ctx,
        ) {
            self.stats.thresholds_failed += 1;
            return;
        }
        if !snapshot.mana().passes(ctx, &stage4, &allocation.totals) {
            self.stats.mana_pruned += 1;
            return;
        }

        self.stats.accepted += 1;
        if self.top.accepts(allocation.score) {
            trace!(event = "candidate", score = allocation.score, level = level);
            let items = Slot::ALL.map(|slot| self.placed_item(slot).name.clone());
            self.top.insert(CandidateResult {
                score: allocation.score,
                items,
                level,
                base_sp: solution.base_totals,
                total_sp: allocation.totals,
                assignment: allocation.assignment,
                assigned_sp: allocation.assignment.total(),
            });
        }
    }
}

impl<'s, T, P> LevelVisitor for WorkerEngine<'s, T, P>
where
    T: Termination,
    P: FnMut(&WorkerStats, &TopK) -> ControlFlow<()>,
{
    fn place(&mut self, slot: Slot, index: usize) -> bool {
        let pool: &'s [Item] = self.pools[slot.index()];
        let item = &pool[index];
        if item.illegal_at_two {
            if let Some(set) = item.set_name.as_deref() {
                if self.tracker.blocks(set, &item.name) {
                    self.stats.illegal_pruned += 1;
                    return false;
                }
                self.tracker.add(set, item.name.as_str());
            }
        }
        self.accumulator.add(item);
        self.placed[slot.index()] = Some(item);
        true
    }

    fn unplace(&mut self, slot: Slot, index: usize) {
        let pool: &'s [Item] = self.pools[slot.index()];
        let item = &pool[index];
        self.placed[slot.index()] = None;
        self.accumulator.remove(item);
        if item.illegal_at_two {
            if let Some(set) = item.set_name.as_deref() {
                self.tracker.remove(set, &item.name);
            }
        }
    }

    fn leaf(&mut self, level: usize) {
        self.stats.checked += 1;
        self.lifetime_leaves += 1;
        self.evaluate(level);

        if self.stats.checked % self.progress_interval == 0
            && (self.on_progress)(&self.stats, &self.top).is_break()
        {
            self.stopped = true;
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        self.polls += 1;
        if self.polls % POLL_INTERVAL == 0 {
            let scope = TerminationScope::new(self.started, self.lifetime_leaves);
            if self.termination.is_terminated(&scope) {
                info!(
                    event = "worker_terminated",
                    leaves = self.lifetime_leaves,
                    elapsed_ms = scope.elapsed().as_millis() as u64,
                );
                self.stopped = true;
            }
        }
        self.stopped
    }
}

/// Everything a worker thread needs besides its channels.
#[derive(Debug, Clone)]
pub(crate) struct WorkerSetup {
    pub worker_id: usize,
    pub solver: Arc<dyn SkillPointSolver>,
    pub config: SearchConfig,
    pub cancel: Arc<AtomicBool>,
    pub started: Instant,
}

/// Body of one worker thread.
///
/// Waits for `Init`, then searches every `Run` item it receives until
/// `Shutdown` or until the command channel closes. A panic inside a run is
/// reported as [`WorkerEvent::Failed`] and the engine is rebuilt.
pub(crate) fn worker_loop(
    setup: WorkerSetup,
    commands: Receiver<WorkerCommand>,
    events: Sender<WorkerEvent>,
) {
    let worker_id = setup.worker_id;
    let snapshot = loop {
        match commands.recv() {
            Ok(WorkerCommand::Init { snapshot }) => break snapshot,
            Ok(WorkerCommand::Run(_)) => {
                warn!(event = "worker_uninitialized", worker_id = worker_id);
            }
            Ok(WorkerCommand::Shutdown) | Err(_) => return,
        }
    };

    let make_engine = || {
        let progress_events = events.clone();
        WorkerEngine::new(
            &snapshot,
            Arc::clone(&setup.solver),
            search_termination(Arc::clone(&setup.cancel), &setup.config),
            setup.started,
            setup.config.progress_interval,
            move |stats: &WorkerStats, top: &TopK| {
                let _ = progress_events.send(WorkerEvent::Progress {
                    worker_id,
                    stats: *stats,
                    best_score: top.best().map(|c| c.score),
                    top_items: top.iter().map(|c| c.items.clone()).collect(),
                });
                ControlFlow::Continue(())
            },
        )
    };
    let mut engine = make_engine();

    while let Ok(command) = commands.recv() {
        let work = match command {
            WorkerCommand::Run(work) => work,
            WorkerCommand::Init { .. } => continue,
            WorkerCommand::Shutdown => break,
        };

        info!(event = "partition_start", worker_id = worker_id, partition = ?work);
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| engine.run(work.as_ref())));
        let event = match outcome {
            Ok(report) => {
                info!(
                    event = "partition_end",
                    worker_id = worker_id,
                    partition = ?work,
                    checked = report.stats.checked,
                    completed = report.completed,
                    duration_ms = started.elapsed().as_millis() as u64,
                );
                WorkerEvent::Done {
                    worker_id,
                    work,
                    stats: report.stats,
                    top: report.top,
                    completed: report.completed,
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(
                    event = "partition_failed",
                    worker_id = worker_id,
                    partition = ?work,
                    message = %message,
                );
                engine = make_engine();
                WorkerEvent::Failed {
                    worker_id,
                    work,
                    message,
                }
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests;
