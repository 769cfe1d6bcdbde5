//! External termination via a shared AtomicBool flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Termination, TerminationScope};

/// Terminates when an external flag is set.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use gearforge_solver::termination::ExternalTermination;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let term = ExternalTermination::new(flag.clone());
///
/// flag.store(true, Ordering::SeqCst);
/// assert!(term.is_set());
/// ```
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Termination for ExternalTermination {
    fn is_terminated(&self, _scope: &TerminationScope) -> bool {
        self.is_set()
    }
}
