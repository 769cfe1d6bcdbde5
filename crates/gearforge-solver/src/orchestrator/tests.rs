//! End-to-end search tests.

use super::*;
use gearforge_config::ThreadCount;
use gearforge_core::{
    Attribute, BoostRegistry, GearForgeError, ItemCategory, Restrictions, ScoringTarget,
    SkillDirections, SkillPoints, Slot, StatId, Threshold, ThresholdStat, ValidationError,
};
use gearforge_scoring::{Piece, SkillPointSolution};
use gearforge_test::{bolt_combo, hp_item, synthetic_catalog, test_weapon, twin_rings, twin_set};

use crate::event::CountingSearchListener;

fn request() -> SearchRequest {
    SearchRequest::new(test_weapon())
        .with_combo(bolt_combo())
        .with_boosts(BoostRegistry::new().with_boost("Surge", vec![(StatId::DamagePct, 20.0)]))
}

fn hp_request() -> SearchRequest {
    request()
        .with_target(ScoringTarget::Stat(StatId::Hp))
        .with_items(vec![
            hp_item("H1", ItemCategory::Helmet, 10),
            hp_item("C1", ItemCategory::Chestplate, 5),
        ])
}

fn cooperative() -> GearSearch {
    GearSearch::new(SearchConfig::new().with_thread_count(ThreadCount::None))
}

fn parallel(workers: usize) -> GearSearch {
    GearSearch::new(SearchConfig::new().with_thread_count(ThreadCount::Count(workers)))
}

fn scores(result: &SearchResult) -> Vec<f64> {
    result.top.iter().map(|c| c.score).collect()
}

#[test]
fn test_hp_scenario_finds_best_pair() {
    for search in [cooperative(), parallel(2)] {
        let result = search.run(&hp_request()).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Found);
        assert!(result.is_exhaustive());
        assert_eq!(result.candidate_count, 4);
        assert_eq!(result.statistics.totals.checked, 4);

        let best = result.best().unwrap();
        assert_eq!(best.score, 15.0);
        assert_eq!(best.item(Slot::Helmet), "H1");
        assert_eq!(best.item(Slot::Chestplate), "C1");
        assert_eq!(scores(&result), vec![15.0, 10.0, 5.0, 0.0]);
        let levels: Vec<usize> = result.top.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![2, 1, 1, 0]);
    }
}

#[test]
fn test_unreachable_skill_threshold_reports_thresholds() {
    let restrictions = Restrictions::default()
        .with_threshold(Threshold::at_least(ThresholdStat::Skill(Attribute::Strength), 50.0))
        .with_skill_directions(SkillDirections::ALL_ENABLED.disable(Attribute::Strength));
    let request = hp_request().with_restrictions(restrictions);

    let result = cooperative().run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::NoBuildsMetThresholds);
    assert!(result.top.is_empty());
    assert!(result.statistics.totals.sp_feasible > 0);
    assert_eq!(result.statistics.totals.thresholds_failed, 4);
}

#[test]
fn test_reachable_skill_threshold_is_met_by_extra_points() {
    let restrictions = Restrictions::default()
        .with_threshold(Threshold::at_least(ThresholdStat::Skill(Attribute::Strength), 30.0));
    let request = hp_request().with_restrictions(restrictions);

    let result = cooperative().run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::Found);
    assert_eq!(scores(&result), vec![15.0, 10.0, 5.0, 0.0]);
    for candidate in result.top.iter() {
        assert!(candidate.total_sp[Attribute::Strength] >= 30);
        assert!(candidate.assigned_sp <= 200);
    }
}

#[test]
fn test_negative_bonus_without_requirement_is_not_pruned() {
    let cursed = hp_item("Cursed", ItemCategory::Helmet, 50).with_skill_bonus(Attribute::Agility, -5);
    let request = hp_request().with_level(1).with_items(vec![cursed]);

    let result = cooperative().run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::Found);
    assert_eq!(result.statistics.totals.prefilter_pruned, 0);
    let best = result.best().unwrap();
    assert_eq!(best.score, 50.0);
    assert_eq!(best.item(Slot::Helmet), "Cursed");
    assert_eq!(best.assigned_sp, 0);
}

#[test]
fn test_disabled_direction_blocks_weapon_requirement() {
    let mut weapon = test_weapon();
    weapon.item = weapon.item.with_requirement(Attribute::Strength, 30);
    let restrictions =
        Restrictions::default().with_skill_directions(SkillDirections::ALL_ENABLED.disable(Attribute::Strength));
    let mut request = hp_request().with_restrictions(restrictions);
    request.weapon = Some(weapon);

    let result = cooperative().run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::SpInfeasible);
    assert!(result.top.is_empty());
    assert_eq!(result.statistics.totals.sp_infeasible, 4);
}

#[test]
fn test_impossible_weapon_reports_sp_infeasible() {
    let mut weapon = test_weapon();
    weapon.item = weapon.item.with_requirement(Attribute::Strength, 150);
    let mut request = hp_request();
    request.weapon = Some(weapon);

    let result = parallel(2).run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::SpInfeasible);
    assert_eq!(result.statistics.totals.sp_feasible, 0);
    assert_eq!(result.statistics.totals.prefilter_pruned, 4);
}

#[test]
fn test_validation_error_starts_nothing() {
    let listener = Arc::new(CountingSearchListener::new());
    let search = parallel(2).with_listener(listener.clone());
    let mut request = hp_request();
    request.weapon = None;

    let err = search.run(&request).unwrap_err();
    assert!(matches!(err, GearForgeError::Validation(ValidationError::NoWeapon)));
    assert_eq!(listener.search_started_count(), 0);
    assert_eq!(listener.search_ended_count(), 0);
}

#[test]
fn test_parallel_matches_cooperative() {
    let (a, b) = twin_rings();
    let mut items = synthetic_catalog(2, 21);
    items.extend([a, b]);
    let request = request().with_set(twin_set()).with_items(items);

    let single = cooperative().run(&request).unwrap();
    let config = SearchConfig::new()
        .with_thread_count(ThreadCount::Count(3))
        .with_partitions_per_worker(3)
        .with_progress_interval(500);
    let multi = GearSearch::new(config).run(&request).unwrap();

    assert_eq!(single.outcome, multi.outcome);
    assert_eq!(scores(&single), scores(&multi));
    // illegal-set prunes depend on loop order, leaf counters do not
    let (s, m) = (single.statistics.totals, multi.statistics.totals);
    assert_eq!(s.checked, m.checked);
    assert_eq!(s.sp_feasible, m.sp_feasible);
    assert_eq!(s.accepted, m.accepted);
    assert!(multi.statistics.partitions_run > 1);
    assert_eq!(multi.workers, 3);
    assert!(multi.lost_partitions.is_empty());
}

#[test]
fn test_leaf_limit_cancels_with_partial_results() {
    let request = request().with_items(synthetic_catalog(3, 2));
    let config = SearchConfig::new()
        .with_thread_count(ThreadCount::None)
        .with_leaf_count_limit(50);
    let result = GearSearch::new(config).run(&request).unwrap();

    assert_eq!(result.outcome, SearchOutcome::Cancelled);
    assert!(!result.is_exhaustive());
    assert!((result.statistics.totals.checked as u128) < result.candidate_count);
}

#[test]
fn test_yield_break_cancels() {
    let search = GearSearch::new(
        SearchConfig::new()
            .with_thread_count(ThreadCount::None)
            .with_yield_interval(10),
    );
    let request = request().with_items(synthetic_catalog(2, 8));
    let mut yields = 0;
    let result = search
        .run_cooperative(&request, |progress| {
            yields += 1;
            assert_eq!(progress.checked, 10 * yields);
            if yields == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    assert_eq!(result.outcome, SearchOutcome::Cancelled);
    assert_eq!(result.statistics.totals.checked, 30);
    assert_eq!(result.workers, 0);
}

#[test]
fn test_external_cancel_stops_parallel_search() {
    let search = parallel(2);
    let request = request().with_items(synthetic_catalog(4, 3));

    // The flag is reset when a run starts, so set it from a listener.
    #[derive(Debug)]
    struct CancelOnStart(Arc<AtomicBool>);
    impl SearchListener for CancelOnStart {
        fn on_search_started(&self, _candidate_count: u128, _workers: usize) {
            self.0.store(true, Ordering::SeqCst);
        }
    }
    let handle = search.cancel_handle();
    let search = search.with_listener(Arc::new(CancelOnStart(handle)));

    let result = search.run(&request).unwrap();
    assert_eq!(result.outcome, SearchOutcome::Cancelled);
    assert!((result.statistics.totals.checked as u128) < result.candidate_count);
}

#[test]
fn test_listener_sees_lifecycle() {
    let listener = Arc::new(CountingSearchListener::new());
    let search = GearSearch::new(
        SearchConfig::new()
            .with_thread_count(ThreadCount::None)
            .with_yield_interval(1),
    )
    .with_listener(listener.clone());

    search.run(&hp_request()).unwrap();
    assert_eq!(listener.search_started_count(), 1);
    assert_eq!(listener.progress_count(), 4);
    assert_eq!(listener.partition_finished_count(), 1);
    assert_eq!(listener.search_ended_count(), 1);
}

/// Delegates to [`EquipOrderSolver`] but panics on any build with "Cursed".
#[derive(Debug)]
struct CursedSolver;

impl SkillPointSolver for CursedSolver {
    fn solve<'a>(
        &self,
        pieces: &[Piece<'a>],
        weapon: Piece<'a>,
        fixed_bonus: SkillPoints,
        directions: SkillDirections,
        budget: i32,
    ) -> Option<SkillPointSolution<'a>> {
        if pieces.iter().any(|p| p.item.name == "Cursed") {
            panic!("cursed item equipped");
        }
        EquipOrderSolver::new().solve(pieces, weapon, fixed_bonus, directions, budget)
    }
}

#[test]
fn test_panicking_partition_is_retried_then_lost() {
    let listener = Arc::new(CountingSearchListener::new());
    let search = parallel(2)
        .with_solver(Arc::new(CursedSolver))
        .with_listener(listener.clone());
    let request = hp_request().with_items(vec![
        hp_item("H1", ItemCategory::Helmet, 10),
        hp_item("Cursed", ItemCategory::Helmet, 1),
        hp_item("C1", ItemCategory::Chestplate, 5),
    ]);

    let result = search.run(&request).unwrap();

    // helmet pool [NONE, H1, Cursed] is split into three single-entry partitions
    assert_eq!(result.lost_partitions.len(), 1);
    let lost = result.lost_partitions[0].unwrap();
    assert_eq!((lost.start, lost.end), (2, 3));
    assert_eq!(result.outcome, SearchOutcome::Found);
    assert!(!result.is_exhaustive());
    assert_eq!(result.best().unwrap().score, 15.0);
    assert_eq!(result.statistics.partitions_run, 4);
    assert_eq!(listener.partition_finished_count(), 2);
}
