//! Skill-point feasibility: the O(1) prefilter and the exact solver.
//!
//! Requirement rules:
//! - An item's requirement is checked when it is equipped, against manual
//!   points plus the bonuses (item and active set) of the pieces equipped
//!   before it.
//! - Every requirement must still hold against the final totals.
//! - At most [`MANUAL_SKILL_POINT_CAP`] manual points per attribute.

use std::fmt::Debug;

use smallvec::SmallVec;
use tracing::trace;

use gearforge_core::{Attribute, SkillDirections, SkillPoints, MANUAL_SKILL_POINT_CAP};

use crate::sets::{set_skill_delta, Piece, SetCounts};

/// Negative-bonus items beyond this count are not permuted exhaustively.
const MAX_PERMUTED: usize = 6;

/// Lower bound on manual points from the O(1) prefilter.
///
/// `max_requirements` is the per-attribute maximum requirement over all
/// equipped pieces, `bonus` the summed item bonuses (tomes included) and
/// `optimistic_set` an upper bound on skill points any active set can grant.
/// Attributes nothing requires are never raised, whatever their bonus.
pub fn sp_lower_bound(
    max_requirements: SkillPoints,
    bonus: SkillPoints,
    optimistic_set: SkillPoints,
) -> SkillPoints {
    let mut lower = SkillPoints::ZERO;
    for a in Attribute::ALL {
        if max_requirements[a] > 0 {
            lower[a] = (max_requirements[a] - bonus[a] - optimistic_set[a]).max(0);
        }
    }
    lower
}

/// Necessary condition for feasibility.
pub fn passes_prefilter(lower_bound: &SkillPoints, budget: i32) -> bool {
    lower_bound.0.iter().all(|&v| v <= MANUAL_SKILL_POINT_CAP) && lower_bound.total() <= budget
}

/// Result of solving the skill points of one candidate.
#[derive(Debug, Clone)]
pub struct SkillPointSolution<'a> {
    /// Minimum manual points per attribute.
    pub assignment: SkillPoints,
    /// Manual points plus item (and fixed) bonuses.
    pub base_totals: SkillPoints,
    /// `base_totals` plus active set bonuses.
    pub final_totals: SkillPoints,
    /// Sum of `assignment`.
    pub assigned_count: i32,
    pub set_counts: SetCounts<'a>,
}

/// Computes the minimum manual skill points a candidate needs.
pub trait SkillPointSolver: Send + Sync + Debug {
    /// Solves for `pieces` (armor and accessories in equip order) followed by
    /// `weapon`. `fixed_bonus` holds skill points from tomes. Returns `None`
    /// when no equip order fits the per-attribute cap or the `budget`, or
    /// every order needs manual points in an attribute `directions` disables.
    fn solve<'a>(
        &self,
        pieces: &[Piece<'a>],
        weapon: Piece<'a>,
        fixed_bonus: SkillPoints,
        directions: SkillDirections,
        budget: i32,
    ) -> Option<SkillPointSolution<'a>>;
}

/// Tries equip orders to minimize manual points.
///
/// Items with only non-negative bonuses are equipped first, each time picking
/// the item that needs the fewest extra manual points. Every permutation of
/// the items with negative bonuses is then tried after them; the weapon is
/// always last.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquipOrderSolver;

impl EquipOrderSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Running state while equipping pieces in order.
struct EquipState<'a> {
    prefix: SkillPoints,
    manual: SkillPoints,
    sets: SetCounts<'a>,
}

impl<'a> EquipState<'a> {
    fn new(fixed_bonus: SkillPoints) -> Self {
        Self {
            prefix: fixed_bonus,
            manual: SkillPoints::ZERO,
            sets: SetCounts::new(),
        }
    }

    /// Extra manual points equipping `piece` now would need.
    fn extra_cost(&self, piece: &Piece<'a>) -> i32 {
        piece
            .item
            .requirements
            .iter()
            .filter(|&(_, req)| req > 0)
            .map(|(a, req)| (req - self.prefix[a] - self.manual[a]).max(0))
            .sum()
    }

    fn equip(&mut self, piece: &Piece<'a>) {
        raise_to_requirement(&mut self.manual, &piece.item.requirements, &self.prefix);
        self.prefix += piece.item.skill_points;
        if let (Some(set), Some((old, new))) = (piece.set, self.sets.push(piece)) {
            self.prefix += set_skill_delta(set, old, new);
        }
    }
}

fn raise_to_requirement(manual: &mut SkillPoints, req: &SkillPoints, available: &SkillPoints) {
    for a in Attribute::ALL {
        if req[a] > 0 {
            manual[a] = manual[a].max(req[a] - available[a]);
        }
    }
}

fn within_cap(manual: &SkillPoints) -> bool {
    manual.0.iter().all(|&v| v <= MANUAL_SKILL_POINT_CAP)
}

fn respects_directions(manual: &SkillPoints, directions: SkillDirections) -> bool {
    Attribute::ALL
        .iter()
        .all(|&a| directions.is_enabled(a) || manual[a] == 0)
}

impl EquipOrderSolver {
    /// Greedy order for pieces whose bonuses are all non-negative.
    fn order_non_negative<'a>(
        pieces: &[Piece<'a>],
        fixed_bonus: SkillPoints,
    ) -> SmallVec<[Piece<'a>; 9]> {
        let mut remaining: SmallVec<[Piece<'a>; 9]> = pieces.iter().copied().collect();
        let mut state = EquipState::new(fixed_bonus);
        let mut order = SmallVec::new();
        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_cost = i32::MAX;
            for (i, piece) in remaining.iter().enumerate() {
                let cost = state.extra_cost(piece);
                if cost < best_cost {
                    best = i;
                    best_cost = cost;
                }
            }
            let piece = remaining.remove(best);
            state.equip(&piece);
            order.push(piece);
        }
        order
    }

    /// Manual points needed for one full equip order, with the summed
    /// item, set and fixed bonuses.
    fn evaluate<'a>(
        order: impl Iterator<Item = Piece<'a>> + Clone,
        fixed_bonus: SkillPoints,
    ) -> (SkillPoints, SkillPoints, SetCounts<'a>) {
        let mut state = EquipState::new(fixed_bonus);
        for piece in order.clone() {
            state.equip(&piece);
        }
        for piece in order {
            raise_to_requirement(&mut state.manual, &piece.item.requirements, &state.prefix);
        }
        (state.manual.clamp_non_negative(), state.prefix, state.sets)
    }
}

impl SkillPointSolver for EquipOrderSolver {
    fn solve<'a>(
        &self,
        pieces: &[Piece<'a>],
        weapon: Piece<'a>,
        fixed_bonus: SkillPoints,
        directions: SkillDirections,
        budget: i32,
    ) -> Option<SkillPointSolution<'a>> {
        let (negative, non_negative): (SmallVec<[Piece<'a>; 9]>, SmallVec<[Piece<'a>; 9]>) =
            pieces
                .iter()
                .copied()
                .filter(|p| !p.item.is_none())
                .partition(|p| p.item.skill_points.has_negative());

        let head = Self::order_non_negative(&non_negative, fixed_bonus);
        let mut tail: SmallVec<[Piece<'a>; 9]> = negative;

        let mut best: Option<(SkillPoints, SkillPoints, SetCounts<'a>)> = None;
        let mut consider = |tail: &[Piece<'a>]| {
            let order = head
                .iter()
                .chain(tail.iter())
                .copied()
                .chain(std::iter::once(weapon));
            let (manual, totals, sets) = Self::evaluate(order, fixed_bonus);
            if !within_cap(&manual) || !respects_directions(&manual, directions) {
                return;
            }
            if best.as_ref().map_or(true, |(m, _, _)| manual.total() < m.total()) {
                best = Some((manual, totals, sets));
            }
        };

        if tail.len() <= MAX_PERMUTED {
            for_each_permutation(&mut tail, &mut consider);
        } else {
            trace!(event = "sp_permutations_capped", negative_items = tail.len());
            consider(&tail[..]);
            tail.reverse();
            consider(&tail[..]);
        }

        let (assignment, bonus_totals, set_counts) = best?;
        if assignment.total() > budget {
            return None;
        }
        let base_totals = bonus_totals - set_counts.skill_bonus() + assignment;
        Some(SkillPointSolution {
            assignment,
            base_totals,
            final_totals: bonus_totals + assignment,
            assigned_count: assignment.total(),
            set_counts,
        })
    }
}

/// Visits every permutation of `items` (Heap's algorithm).
fn for_each_permutation<T, F: FnMut(&[T])>(items: &mut [T], f: &mut F) {
    let n = items.len();
    let mut c = vec![0usize; n];
    f(items);
    let mut i = 0;
    while i < n {
        if c[i] < i {
            if i % 2 == 0 {
                items.swap(0, i);
            } else {
                items.swap(c[i], i);
            }
            f(items);
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
}
