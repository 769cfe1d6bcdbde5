//! Tests for the event system.

use super::*;
use crate::partition::PartitionTarget;
use gearforge_core::Slot;

fn progress() -> SearchProgress {
    SearchProgress {
        checked: 10,
        sp_feasible: 4,
        accepted: 2,
        best_score: Some(1.5),
        elapsed: Duration::from_millis(3),
    }
}

#[test]
fn test_event_support_new() {
    let support = SearchEventSupport::new();
    assert_eq!(support.listener_count(), 0);
    assert!(!support.has_listeners());
}

#[test]
fn test_fire_reaches_every_listener() {
    let first = Arc::new(CountingSearchListener::new());
    let second = Arc::new(CountingSearchListener::new());
    let mut support = SearchEventSupport::new();
    support.add_listener(first.clone());
    support.add_listener(second.clone());
    support.add_listener(Arc::new(LoggingSearchListener::with_prefix("[test] ")));

    let partition = Partition::new(PartitionTarget::Slot(Slot::Helmet), 0, 3);
    support.fire_search_started(100, 2);
    support.fire_progress(&progress());
    support.fire_progress(&progress());
    support.fire_partition_finished(Some(&partition), &WorkerStats::default());

    for listener in [&first, &second] {
        assert_eq!(listener.search_started_count(), 1);
        assert_eq!(listener.progress_count(), 2);
        assert_eq!(listener.partition_finished_count(), 1);
        assert_eq!(listener.search_ended_count(), 0);
    }
}

#[test]
fn test_counting_listener_reset() {
    let listener = CountingSearchListener::new();
    listener.on_search_started(1, 0);
    listener.on_progress(&progress());
    listener.reset();
    assert_eq!(listener.search_started_count(), 0);
    assert_eq!(listener.progress_count(), 0);
}

#[test]
fn test_clear_listeners() {
    let mut support = SearchEventSupport::new();
    support.add_listener(Arc::new(CountingSearchListener::new()));
    support.clear_listeners();
    assert!(!support.has_listeners());
}
