//! Bounded best-first result list.

use serde::{Deserialize, Serialize};

use gearforge_core::{SkillPoints, Slot};

/// Number of results every tracker keeps.
pub const TOP_K: usize = 5;

/// A feasible, scored loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub score: f64,
    /// Item names in [`Slot::ALL`] order; empty slots hold `"NONE"`.
    pub items: [String; 8],
    /// Rank sum the candidate was found at.
    ///
    /// Ranks are absolute pool positions and every pool starts with the NONE
    /// item at rank 0, so the all-empty loadout is level 0 and equipping the
    /// best item of two slots is level 2.
    pub level: usize,
    /// Manual points needed before greedy spending.
    pub base_sp: SkillPoints,
    /// Final attribute totals after greedy spending.
    pub total_sp: SkillPoints,
    /// Manual points per attribute after greedy spending.
    pub assignment: SkillPoints,
    /// Sum of `assignment`; never above the budget.
    pub assigned_sp: i32,
}

impl CandidateResult {
    pub fn item(&self, slot: Slot) -> &str {
        &self.items[slot.index()]
    }
}

/// Results sorted by non-increasing score, at most `capacity` long.
///
/// Ties keep insertion order.
///
/// # Example
///
/// ```
/// use gearforge_solver::TopK;
///
/// let top = TopK::new();
/// assert!(top.accepts(f64::MIN));
/// assert_eq!(top.capacity(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopK {
    entries: Vec<CandidateResult>,
    capacity: usize,
}

impl Default for TopK {
    fn default() -> Self {
        Self::new()
    }
}

impl TopK {
    pub fn new() -> Self {
        Self::with_capacity(TOP_K)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if a candidate scoring `score` would be kept.
    #[inline]
    pub fn accepts(&self, score: f64) -> bool {
        self.entries.len() < self.capacity
            || self.entries.last().is_some_and(|last| score > last.score)
    }

    /// Appends, re-sorts and truncates. Returns whether the candidate was kept.
    pub fn insert(&mut self, candidate: CandidateResult) -> bool {
        if !self.accepts(candidate.score) {
            return false;
        }
        self.entries.push(candidate);
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.entries.truncate(self.capacity);
        true
    }

    /// Inserts every entry of `other`.
    pub fn merge(&mut self, other: TopK) {
        for candidate in other.entries {
            self.insert(candidate);
        }
    }

    pub fn best(&self) -> Option<&CandidateResult> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[CandidateResult] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<CandidateResult> {
        self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateResult> {
        self.entries.iter()
    }
}
