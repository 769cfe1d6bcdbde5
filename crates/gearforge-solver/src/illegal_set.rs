//! Tracking of placed members of illegal-at-two sets.

use smallvec::SmallVec;

/// Reference counts of placed `(set, item)` pairs for sets whose 2-piece
/// bonus is illegal.
///
/// Placing the same item twice is legal; placing a second distinct member of
/// the set is not. The enumerator checks [`blocks`](Self::blocks) before
/// descending, so illegal branches are cut at internal nodes.
///
/// # Example
///
/// ```
/// use gearforge_solver::IllegalSetTracker;
///
/// let mut tracker = IllegalSetTracker::new();
/// tracker.add("Twin", "Ring A");
///
/// assert!(!tracker.blocks("Twin", "Ring A"));
/// assert!(tracker.blocks("Twin", "Ring B"));
///
/// tracker.remove("Twin", "Ring A");
/// assert!(!tracker.blocks("Twin", "Ring B"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IllegalSetTracker<'a> {
    entries: SmallVec<[(&'a str, &'a str, u32); 4]>,
}

impl<'a> IllegalSetTracker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, set: &'a str, item: &'a str) {
        match self
            .entries
            .iter_mut()
            .find(|(s, i, _)| *s == set && *i == item)
        {
            Some(entry) => entry.2 += 1,
            None => self.entries.push((set, item, 1)),
        }
    }

    /// Inverse of [`add`](Self::add).
    pub fn remove(&mut self, set: &str, item: &str) {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|(s, i, _)| *s == set && *i == item)
        {
            let entry = &mut self.entries[pos];
            entry.2 -= 1;
            if entry.2 == 0 {
                self.entries.swap_remove(pos);
            }
        }
    }

    /// True if a different member of `set` is already placed.
    #[inline]
    pub fn blocks(&self, set: &str, item: &str) -> bool {
        self.entries.iter().any(|(s, i, _)| *s == set && *i != item)
    }

    /// Number of distinct placed members of `set`.
    pub fn occupants(&self, set: &str) -> usize {
        self.entries.iter().filter(|(s, _, _)| *s == set).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
