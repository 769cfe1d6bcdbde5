//! Composite OR termination.
//!
//! Uses macro-generated tuple implementations for zero type erasure.

use super::{Termination, TerminationScope};

/// Terminates when ANY wrapped termination does.
///
/// # Examples
///
/// ```
/// use gearforge_solver::termination::{LeafCountTermination, OrTermination, TimeTermination};
///
/// // Stop after 30 seconds OR one million leaves
/// let termination = OrTermination((
///     TimeTermination::seconds(30),
///     LeafCountTermination::new(1_000_000),
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

/// Generates `Termination` implementations for OR tuples.
macro_rules! impl_or_termination {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T),+> Termination for OrTermination<($($T,)+)>
        where
            $($T: Termination,)+
        {
            fn is_terminated(&self, scope: &TerminationScope) -> bool {
                $((self.0).$idx.is_terminated(scope))||+
            }
        }
    };
}

impl_or_termination!(0: T0);
impl_or_termination!(0: T0, 1: T1);
impl_or_termination!(0: T0, 1: T1, 2: T2);
impl_or_termination!(0: T0, 1: T1, 2: T2, 3: T3);
impl_or_termination!(0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
