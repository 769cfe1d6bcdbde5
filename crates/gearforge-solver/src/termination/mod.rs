//! Termination conditions for a search.
//!
//! Workers poll their termination between leaves. Any condition firing stops
//! that worker with the partial top-K it has accumulated.

mod composite;
mod external;
mod leaf_count;
mod time;

use std::fmt::Debug;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gearforge_config::SearchConfig;

pub use composite::OrTermination;
pub use external::ExternalTermination;
pub use leaf_count::LeafCountTermination;
pub use time::TimeTermination;

/// What a worker knows when it polls its termination.
#[derive(Debug, Clone, Copy)]
pub struct TerminationScope {
    started: Instant,
    leaves: u64,
}

impl TerminationScope {
    pub fn new(started: Instant, leaves: u64) -> Self {
        Self { started, leaves }
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Leaves evaluated by the polling worker.
    pub fn leaves(&self) -> u64 {
        self.leaves
    }
}

/// Trait for determining when to stop searching.
pub trait Termination: Send + Debug {
    /// Returns true if searching should stop.
    fn is_terminated(&self, scope: &TerminationScope) -> bool;
}

impl<T: Termination> Termination for Option<T> {
    fn is_terminated(&self, scope: &TerminationScope) -> bool {
        self.as_ref().is_some_and(|t| t.is_terminated(scope))
    }
}

/// Termination every worker runs with: the shared cancel flag plus the
/// configured limits.
pub type SearchTermination = OrTermination<(
    ExternalTermination,
    Option<TimeTermination>,
    Option<LeafCountTermination>,
)>;

/// Builds the worker termination from `config`.
pub fn search_termination(cancel: Arc<AtomicBool>, config: &SearchConfig) -> SearchTermination {
    OrTermination((
        ExternalTermination::new(cancel),
        config.time_limit().map(TimeTermination::new),
        config.leaf_count_limit().map(LeafCountTermination::new),
    ))
}

#[cfg(test)]
mod tests;
