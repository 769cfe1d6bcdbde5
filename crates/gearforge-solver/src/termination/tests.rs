//! Tests for termination conditions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gearforge_config::SearchConfig;

use super::*;

fn scope(leaves: u64) -> TerminationScope {
    TerminationScope::new(Instant::now(), leaves)
}

#[test]
fn test_external_termination() {
    let flag = Arc::new(AtomicBool::new(false));
    let term = ExternalTermination::new(flag.clone());
    assert!(!term.is_terminated(&scope(0)));
    flag.store(true, Ordering::SeqCst);
    assert!(term.is_terminated(&scope(0)));
}

#[test]
fn test_time_termination() {
    let started = Instant::now() - Duration::from_millis(50);
    let scope = TerminationScope::new(started, 0);
    assert!(TimeTermination::millis(10).is_terminated(&scope));
    assert!(!TimeTermination::seconds(60).is_terminated(&scope));
}

#[test]
fn test_leaf_count_termination() {
    let term = LeafCountTermination::new(100);
    assert!(!term.is_terminated(&scope(99)));
    assert!(term.is_terminated(&scope(100)));
}

#[test]
fn test_option_and_or() {
    let none: Option<LeafCountTermination> = None;
    assert!(!none.is_terminated(&scope(u64::MAX)));

    let term = OrTermination((
        TimeTermination::seconds(60),
        Some(LeafCountTermination::new(10)),
    ));
    assert!(!term.is_terminated(&scope(5)));
    assert!(term.is_terminated(&scope(10)));
}

#[test]
fn test_search_termination_from_config() {
    let flag = Arc::new(AtomicBool::new(false));
    let config = SearchConfig::new().with_leaf_count_limit(3);
    let term = search_termination(flag.clone(), &config);
    assert!(!term.is_terminated(&scope(2)));
    assert!(term.is_terminated(&scope(3)));

    let unlimited = search_termination(flag.clone(), &SearchConfig::default());
    assert!(!unlimited.is_terminated(&scope(u64::MAX)));
    flag.store(true, Ordering::SeqCst);
    assert!(unlimited.is_terminated(&scope(0)));
}
