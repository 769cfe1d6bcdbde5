//! Tests for the worker engine.

use super::*;
use gearforge_config::SearchConfig;
use gearforge_core::{Attribute, BoostRegistry, ItemCategory, StatId};
use gearforge_scoring::EquipOrderSolver;
use gearforge_test::{bolt_combo, hp_item, synthetic_catalog, test_weapon, twin_rings, twin_set};

use crate::snapshot::SearchRequest;
use crate::termination::{LeafCountTermination, OrTermination};

fn request() -> SearchRequest {
    SearchRequest::new(test_weapon())
        .with_combo(bolt_combo())
        .with_boosts(BoostRegistry::new().with_boost("Surge", vec![(StatId::DamagePct, 20.0)]))
}

fn snapshot(request: &SearchRequest) -> SearchSnapshot {
    SearchSnapshot::build(request, &SearchConfig::default()).unwrap()
}

fn run_all(snapshot: &SearchSnapshot) -> PartitionReport {
    let mut engine = WorkerEngine::new(
        snapshot,
        Arc::new(EquipOrderSolver::new()),
        None::<LeafCountTermination>,
        Instant::now(),
        u64::MAX,
        |_: &WorkerStats, _: &TopK| ControlFlow::Continue(()),
    );
    engine.run(None)
}

#[test]
fn test_finds_best_hp_build() {
    let request = request()
        .with_target(gearforge_core::ScoringTarget::Stat(StatId::Hp))
        .with_items(vec![
            hp_item("H1", ItemCategory::Helmet, 10),
            hp_item("H2", ItemCategory::Helmet, 3),
            hp_item("C1", ItemCategory::Chestplate, 5),
        ]);
    let snapshot = snapshot(&request);
    let report = run_all(&snapshot);

    assert!(report.completed);
    assert_eq!(report.stats.checked, 6);
    assert_eq!(report.stats.accepted, 6);
    let best = report.top.best().unwrap();
    assert_eq!(best.score, 15.0);
    assert_eq!(best.item(Slot::Helmet), "H1");
    assert_eq!(best.item(Slot::Chestplate), "C1");
    assert_eq!(best.item(Slot::Boots), "NONE");
    // H1 and C1 are both rank 1 in their pools
    assert_eq!(best.level, 2);
    let scores: Vec<f64> = report.top.iter().map(|c| c.score).collect();
    assert_eq!(scores, vec![15.0, 10.0, 8.0, 5.0, 3.0]);
}

#[test]
fn test_illegal_pair_is_never_evaluated() {
    let (a, b) = twin_rings();
    let request = request().with_set(twin_set()).with_items(vec![a, b]);
    let snapshot = snapshot(&request);
    let report = run_all(&snapshot);

    // (NONE|A|B) ring pairs: 6, minus the single (A, B) pair
    assert_eq!(report.stats.checked, 5);
    assert_eq!(report.stats.illegal_pruned, 1);
    for candidate in report.top.iter() {
        let rings = [candidate.item(Slot::Ring1), candidate.item(Slot::Ring2)];
        assert!(!(rings.contains(&"Twin Ring A") && rings.contains(&"Twin Ring B")));
    }
    assert!(report
        .top
        .iter()
        .any(|c| c.item(Slot::Ring1) == "Twin Ring A" && c.item(Slot::Ring2) == "Twin Ring A"));
}

#[test]
fn test_locked_illegal_member_blocks_partner() {
    let (a, b) = twin_rings();
    let request = request()
        .with_set(twin_set())
        .with_locked(Slot::Ring1, a.clone())
        .with_items(vec![a, b]);
    let snapshot = snapshot(&request);
    let report = run_all(&snapshot);

    assert_eq!(report.stats.checked, 2);
    assert!(report.top.iter().all(|c| c.item(Slot::Ring2) != "Twin Ring B"));
}

#[test]
fn test_assignments_stay_within_budget() {
    let request = request()
        .with_level(30)
        .with_items(vec![
            hp_item("Heavy", ItemCategory::Helmet, 1).with_requirement(Attribute::Strength, 40),
            hp_item("Split", ItemCategory::Boots, 1)
                .with_requirement(Attribute::Dexterity, 40)
                .with_requirement(Attribute::Defense, 30),
            hp_item("Giver", ItemCategory::Necklace, 1).with_skill_bonus(Attribute::Dexterity, 15),
        ]);
    let snapshot = snapshot(&request);
    let budget = snapshot.budget();
    assert_eq!(budget, 58);
    let report = run_all(&snapshot);

    assert!(report.stats.sp_feasible > 0);
    assert!(report.stats.prefilter_pruned + report.stats.sp_infeasible > 0);
    for candidate in report.top.iter() {
        assert!(candidate.assigned_sp <= budget);
        assert_eq!(candidate.assigned_sp, candidate.assignment.total());
        assert!(candidate.assignment.0.iter().all(|&v| (0..=100).contains(&v)));
    }
}

#[test]
fn test_progress_break_stops_run() {
    let request = request().with_items(synthetic_catalog(2, 5));
    let snapshot = snapshot(&request);
    let mut calls = 0;
    let mut engine = WorkerEngine::new(
        &snapshot,
        Arc::new(EquipOrderSolver::new()),
        None::<LeafCountTermination>,
        Instant::now(),
        4,
        |stats: &WorkerStats, _: &TopK| {
            calls += 1;
            assert_eq!(stats.checked, 4);
            ControlFlow::Break(())
        },
    );
    let report = engine.run(None);
    drop(engine);

    assert!(!report.completed);
    assert_eq!(report.stats.checked, 4);
    assert_eq!(calls, 1);
}

#[test]
fn test_leaf_limit_terminates() {
    let request = request().with_items(synthetic_catalog(3, 9));
    let snapshot = snapshot(&request);
    let total = snapshot.candidate_count();
    let mut engine = WorkerEngine::new(
        &snapshot,
        Arc::new(EquipOrderSolver::new()),
        OrTermination((LeafCountTermination::new(10),)),
        Instant::now(),
        u64::MAX,
        |_: &WorkerStats, _: &TopK| ControlFlow::Continue(()),
    );
    let report = engine.run(None);

    assert!(!report.completed);
    assert!(report.stats.checked >= 10);
    assert!((report.stats.checked as u128) < total);
    assert_eq!(engine.lifetime_leaves(), report.stats.checked);
}

#[test]
fn test_engine_is_reusable_across_partitions() {
    let request = request().with_items(vec![
        hp_item("H1", ItemCategory::Helmet, 10),
        hp_item("H2", ItemCategory::Helmet, 3),
        hp_item("C1", ItemCategory::Chestplate, 5),
    ]);
    let snapshot = snapshot(&request);
    let dims = snapshot.dimensions(None);
    let partitions = crate::partition::plan_partitions(&dims, 3);
    assert_eq!(partitions.len(), 3);

    let mut engine = WorkerEngine::new(
        &snapshot,
        Arc::new(EquipOrderSolver::new()),
        None::<LeafCountTermination>,
        Instant::now(),
        u64::MAX,
        |_: &WorkerStats, _: &TopK| ControlFlow::Continue(()),
    );
    let mut checked = 0;
    for partition in &partitions {
        let report = engine.run(Some(partition));
        assert!(report.completed);
        checked += report.stats.checked;
    }
    assert_eq!(checked, 6);
    assert_eq!(engine.lifetime_leaves(), 6);
}

#[test]
fn test_panic_message_extraction() {
    let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
    assert_eq!(panic_message(boxed.as_ref()), "boom");
    let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
    assert_eq!(panic_message(boxed.as_ref()), "bang");
    let boxed: Box<dyn std::any::Any + Send> = Box::new(7u8);
    assert_eq!(panic_message(boxed.as_ref()), "worker panicked");
}

#[test]
fn test_worker_loop_reports_top_items_in_progress() {
    let request = request()
        .with_target(gearforge_core::ScoringTarget::Stat(StatId::Hp))
        .with_items(vec![
            hp_item("H1", ItemCategory::Helmet, 10),
            hp_item("H2", ItemCategory::Helmet, 3),
            hp_item("C1", ItemCategory::Chestplate, 5),
        ]);
    let snapshot = Arc::new(snapshot(&request));
    let setup = WorkerSetup {
        worker_id: 3,
        solver: Arc::new(EquipOrderSolver::new()),
        config: SearchConfig::new().with_progress_interval(1),
        cancel: Arc::new(AtomicBool::new(false)),
        started: Instant::now(),
    };
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    command_tx.send(WorkerCommand::Init { snapshot }).unwrap();
    command_tx.send(WorkerCommand::Run(None)).unwrap();
    command_tx.send(WorkerCommand::Shutdown).unwrap();

    worker_loop(setup, command_rx, event_tx);

    let events: Vec<WorkerEvent> = event_rx.try_iter().collect();
    assert_eq!(events.len(), 7);
    assert!(events.iter().all(|e| e.worker_id() == 3));
    match &events[5] {
        WorkerEvent::Progress {
            stats,
            best_score,
            top_items,
            ..
        } => {
            assert_eq!(stats.checked, 6);
            assert_eq!(*best_score, Some(15.0));
            assert_eq!(top_items.len(), 5);
            assert_eq!(top_items[0][Slot::Helmet.index()], "H1");
            assert_eq!(top_items[0][Slot::Chestplate.index()], "C1");
        }
        other => panic!("expected progress, got {other:?}"),
    }
    assert!(matches!(
        &events[6],
        WorkerEvent::Done { completed: true, work: None, .. }
    ));
}
