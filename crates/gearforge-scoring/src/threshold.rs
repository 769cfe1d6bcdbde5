//! Threshold prechecks and the exact threshold check.

use gearforge_core::{
    Attribute, ScaledStats, SetCatalog, SkillDirections, SkillPoints, StatId, StatVector,
    Threshold, ThresholdOp, ThresholdStat, MANUAL_SKILL_POINT_CAP,
};

use crate::context::ScoringContext;

/// Value a threshold row is compared against.
pub fn threshold_value(
    stat: ThresholdStat,
    stage4: &ScaledStats,
    totals: &SkillPoints,
    ctx: &ScoringContext,
) -> f64 {
    match stat {
        ThresholdStat::Stat(id) => stage4[id],
        ThresholdStat::Skill(a) => totals[a] as f64,
        ThresholdStat::Ehp => ctx.formulas().ehp(stage4, totals),
    }
}

/// Largest value `stat` can reach at stage 4 given its accumulated value.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StatBound {
    stage1_extra: f64,
    factor: f64,
    post_extra: f64,
}

impl StatBound {
    fn new(stat: StatId, ctx: &ScoringContext, sets: &SetCatalog) -> Self {
        let set_bonus: i64 = sets.iter().map(|s| s.optimistic_stat(stat)).sum();
        Self {
            stage1_extra: (ctx.atree_raw()[stat] + set_bonus) as f64,
            factor: ctx.elemental_factor(stat),
            post_extra: ctx.positive_static_boost(stat) + ctx.max_scaling_bonus(stat),
        }
    }

    #[inline]
    fn upper(&self, running: i64) -> f64 {
        let v = running as f64 + self.stage1_extra;
        let v = if v > 0.0 { v * self.factor } else { v };
        v + self.post_extra
    }
}

/// Rejects candidates whose accumulated stats already miss a `>=` row.
///
/// Only plain stat rows are checked; `ehp` and skill totals depend on set
/// bonuses and greedy allocation.
#[derive(Debug, Clone, Default)]
pub struct FastThresholdCheck {
    rows: Vec<(StatId, StatBound, f64)>,
}

impl FastThresholdCheck {
    pub fn new(thresholds: &[Threshold], ctx: &ScoringContext, sets: &SetCatalog) -> Self {
        let rows = thresholds
            .iter()
            .filter(|t| t.op == ThresholdOp::AtLeast)
            .filter_map(|t| match t.stat {
                ThresholdStat::Stat(id) => Some((id, StatBound::new(id, ctx, sets), t.value)),
                _ => None,
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn passes(&self, running: &StatVector) -> bool {
        self.rows
            .iter()
            .all(|(id, bound, value)| bound.upper(running[*id]) >= *value)
    }
}

/// Optimistic effective-health bound for `ehp >=` rows.
///
/// Assumes every stat that feeds health takes its largest possible bonus and
/// all leftover skill points go to both defense and agility.
#[derive(Debug, Clone)]
pub struct EhpBound {
    required: Option<f64>,
    hp: StatBound,
    hp_bonus: StatBound,
    directions: SkillDirections,
}

impl EhpBound {
    pub fn new(
        thresholds: &[Threshold],
        ctx: &ScoringContext,
        sets: &SetCatalog,
        directions: SkillDirections,
    ) -> Self {
        let required = thresholds
            .iter()
            .filter(|t| t.op == ThresholdOp::AtLeast && t.stat == ThresholdStat::Ehp)
            .map(|t| t.value)
            .reduce(f64::max);
        Self {
            required,
            hp: StatBound::new(StatId::Hp, ctx, sets),
            hp_bonus: StatBound::new(StatId::HpBonus, ctx, sets),
            directions,
        }
    }

    pub fn is_active(&self) -> bool {
        self.required.is_some()
    }

    /// Returns false only when no allocation can reach the required EHP.
    pub fn passes(
        &self,
        running: &StatVector,
        assignment: &SkillPoints,
        final_totals: &SkillPoints,
        budget: i32,
        ctx: &ScoringContext,
    ) -> bool {
        let Some(required) = self.required else {
            return true;
        };
        let mut stats = ScaledStats::zero();
        stats.set(StatId::Hp, self.hp.upper(running[StatId::Hp]));
        stats.set(StatId::HpBonus, self.hp_bonus.upper(running[StatId::HpBonus]));

        let leftover = (budget - assignment.total()).max(0);
        let mut totals = *final_totals;
        for a in [Attribute::Defense, Attribute::Agility] {
            if self.directions.is_enabled(a) {
                totals[a] += leftover.min(MANUAL_SKILL_POINT_CAP - assignment[a]).max(0);
            }
        }
        ctx.formulas().ehp(&stats, &totals) >= required
    }
}

/// Every threshold row against the fully assembled snapshot.
pub fn passes_thresholds(
    thresholds: &[Threshold],
    stage4: &ScaledStats,
    totals: &SkillPoints,
    ctx: &ScoringContext,
) -> bool {
    thresholds
        .iter()
        .all(|t| t.op.holds(threshold_value(t.stat, stage4, totals, ctx), t.value))
}

/// Per-attribute totals the `≥` skill rows demand.
pub fn skill_floors(thresholds: &[Threshold]) -> SkillPoints {
    let mut floors = SkillPoints::ZERO;
    for t in thresholds {
        if let (ThresholdStat::Skill(a), ThresholdOp::AtLeast) = (t.stat, t.op) {
            floors[a] = floors[a].max(t.value.ceil() as i32);
        }
    }
    floors
}
