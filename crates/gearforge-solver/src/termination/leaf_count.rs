//! Leaf count termination.

use super::{Termination, TerminationScope};

/// Terminates once a worker has evaluated `limit` leaves.
#[derive(Debug, Clone)]
pub struct LeafCountTermination {
    limit: u64,
}

impl LeafCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for LeafCountTermination {
    fn is_terminated(&self, scope: &TerminationScope) -> bool {
        scope.leaves() >= self.limit
    }
}
