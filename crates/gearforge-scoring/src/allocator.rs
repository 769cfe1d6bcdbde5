//! Greedy spending of leftover skill points.

use gearforge_core::{Attribute, SkillDirections, SkillPoints, MANUAL_SKILL_POINT_CAP};

/// Step sizes tried in order, coarse to fine.
pub const STEP_SCHEDULE: [i32; 3] = [20, 4, 1];

/// Outcome of a greedy allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// Manual points including the extra ones.
    pub assignment: SkillPoints,
    /// Final totals including the extra points.
    pub totals: SkillPoints,
    pub score: f64,
}

/// Coordinate ascent over the five attributes.
///
/// Enabled attributes are first topped up to their floors (the totals `≥`
/// skill thresholds demand) as far as the cap and budget allow. At each step size the attribute whose step improves the objective most is
/// raised, until no step improves it or the budget or caps are exhausted.
#[derive(Debug, Clone, Copy)]
pub struct GreedyAllocator {
    directions: SkillDirections,
    budget: i32,
    floors: SkillPoints,
}

impl GreedyAllocator {
    pub fn new(directions: SkillDirections, budget: i32) -> Self {
        Self {
            directions,
            budget,
            floors: SkillPoints::ZERO,
        }
    }

    pub fn with_floors(mut self, floors: SkillPoints) -> Self {
        self.floors = floors;
        self
    }

    fn raise_to_floors(&self, assignment: &mut SkillPoints, totals: &mut SkillPoints) {
        for a in Attribute::ALL {
            if !self.directions.is_enabled(a) {
                continue;
            }
            let room = (MANUAL_SKILL_POINT_CAP - assignment[a]).min(self.budget - assignment.total());
            let extra = (self.floors[a] - totals[a]).min(room).max(0);
            assignment[a] += extra;
            totals[a] += extra;
        }
    }

    pub fn allocate<F>(&self, assignment: SkillPoints, totals: SkillPoints, mut objective: F) -> Allocation
    where
        F: FnMut(&SkillPoints) -> f64,
    {
        let mut assignment = assignment;
        let mut totals = totals;
        self.raise_to_floors(&mut assignment, &mut totals);
        let mut score = objective(&totals);

        for step in STEP_SCHEDULE {
            loop {
                let remaining = self.budget - assignment.total();
                if remaining < step {
                    break;
                }
                let mut best: Option<(Attribute, f64)> = None;
                for a in Attribute::ALL {
                    if !self.directions.is_enabled(a) || assignment[a] + step > MANUAL_SKILL_POINT_CAP {
                        continue;
                    }
                    let mut trial = totals;
                    trial[a] += step;
                    let s = objective(&trial);
                    if s > best.map_or(score, |(_, b)| b) {
                        best = Some((a, s));
                    }
                }
                let Some((a, s)) = best else {
                    break;
                };
                assignment[a] += step;
                totals[a] += step;
                score = s;
            }
        }

        Allocation {
            assignment,
            totals,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_objective_spends_nothing() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED, 200);
        let out = alloc.allocate(SkillPoints::ZERO, SkillPoints::ZERO, |_| 15.0);
        assert_eq!(out.assignment, SkillPoints::ZERO);
        assert_eq!(out.score, 15.0);
    }

    #[test]
    fn test_spends_whole_budget_on_best_attribute() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED, 57);
        let out = alloc.allocate(SkillPoints::ZERO, SkillPoints::ZERO, |t| {
            2.0 * t[Attribute::Strength] as f64 + t[Attribute::Dexterity] as f64
        });
        assert_eq!(out.assignment.0, [57, 0, 0, 0, 0]);
        assert_eq!(out.score, 114.0);
    }

    #[test]
    fn test_respects_cap_and_directions() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED.disable(Attribute::Intelligence), 200);
        let start = SkillPoints::new([90, 0, 0, 0, 0]);
        let out = alloc.allocate(start, start, |t| {
            t[Attribute::Strength] as f64 * 3.0 + t[Attribute::Intelligence] as f64 * 5.0 + t[Attribute::Agility] as f64
        });
        assert_eq!(out.assignment[Attribute::Strength], MANUAL_SKILL_POINT_CAP);
        assert_eq!(out.assignment[Attribute::Intelligence], 0);
        assert_eq!(out.assignment[Attribute::Agility], 100);
        assert!(out.assignment.total() <= 200);
    }

    #[test]
    fn test_diminishing_returns_split_points() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED, 40);
        let out = alloc.allocate(SkillPoints::ZERO, SkillPoints::ZERO, |t| {
            (t[Attribute::Strength] as f64).sqrt() + (t[Attribute::Defense] as f64).sqrt()
        });
        assert_eq!(out.assignment[Attribute::Strength], 20);
        assert_eq!(out.assignment[Attribute::Defense], 20);
    }

    #[test]
    fn test_item_bonus_in_totals_does_not_count_against_cap() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED, 100);
        let out = alloc.allocate(
            SkillPoints::ZERO,
            SkillPoints::new([0, 0, 0, 30, 0]),
            |t| t[Attribute::Defense] as f64,
        );
        assert_eq!(out.assignment[Attribute::Defense], 100);
        assert_eq!(out.totals[Attribute::Defense], 130);
    }

    #[test]
    fn test_floors_are_met_before_ascent() {
        let floors = SkillPoints::new([30, 0, 0, 0, 25]);
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED.disable(Attribute::Agility), 50)
            .with_floors(floors);
        let out = alloc.allocate(SkillPoints::ZERO, SkillPoints::new([10, 0, 0, 0, 5]), |t| {
            t[Attribute::Defense] as f64
        });
        assert_eq!(out.assignment[Attribute::Strength], 20);
        assert_eq!(out.totals[Attribute::Strength], 30);
        assert_eq!(out.assignment[Attribute::Agility], 0);
        // the rest goes to the objective
        assert_eq!(out.assignment[Attribute::Defense], 30);
        assert_eq!(out.assignment.total(), 50);
    }

    #[test]
    fn test_floor_is_limited_by_budget() {
        let alloc = GreedyAllocator::new(SkillDirections::ALL_ENABLED, 12)
            .with_floors(SkillPoints::new([30, 0, 0, 0, 0]));
        let out = alloc.allocate(SkillPoints::ZERO, SkillPoints::ZERO, |_| 1.0);
        assert_eq!(out.assignment[Attribute::Strength], 12);
        assert!(out.totals[Attribute::Strength] < 30);
    }
}
