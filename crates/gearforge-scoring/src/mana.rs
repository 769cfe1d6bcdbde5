//! Mana sustainability over a timed combo.

use gearforge_core::{ScaledStats, SkillPoints, StatId};

use crate::context::ScoringContext;
use crate::formula::{BASE_MANA, BASE_MANA_PER_SECOND};

/// Deficit allowed in sustainable mode before a candidate is rejected.
pub const DEFAULT_MANA_TOLERANCE: f64 = 5.0;

/// Mana spent and gained over one combo.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManaBalance {
    pub start: f64,
    pub cost: f64,
    pub regen: f64,
}

impl ManaBalance {
    pub fn deficit(&self) -> f64 {
        self.cost - self.regen
    }

    pub fn ending(&self) -> f64 {
        self.start - self.cost + self.regen
    }
}

/// Rejects candidates that cannot pay for the combo.
///
/// In sustainable mode the combo must pay for itself within the tolerance;
/// with downtime allowed the starting pool may be drained but not emptied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManaCheck {
    combo_time: Option<f64>,
    allow_downtime: bool,
    tolerance: f64,
}

impl Default for ManaCheck {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ManaCheck {
    pub fn disabled() -> Self {
        Self {
            combo_time: None,
            allow_downtime: false,
            tolerance: DEFAULT_MANA_TOLERANCE,
        }
    }

    /// A check over `combo_time` seconds; non-positive durations disable it.
    pub fn new(combo_time: f64, allow_downtime: bool) -> Self {
        Self {
            combo_time: (combo_time > 0.0).then_some(combo_time),
            allow_downtime,
            tolerance: DEFAULT_MANA_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn is_active(&self) -> bool {
        self.combo_time.is_some()
    }

    pub fn balance(
        &self,
        ctx: &ScoringContext,
        stage4: &ScaledStats,
        totals: &SkillPoints,
    ) -> ManaBalance {
        let time = self.combo_time.unwrap_or(0.0);
        let cost = ctx
            .rows()
            .iter()
            .map(|row| {
                let stats = ctx.row_stats(stage4, row);
                ctx.formulas().spell_cost(&stats, totals, &row.spell) * row.quantity
            })
            .sum();
        ManaBalance {
            start: BASE_MANA + stage4[StatId::MaxMana],
            cost,
            regen: (BASE_MANA_PER_SECOND + stage4[StatId::ManaRegen] / 5.0) * time,
        }
    }

    pub fn passes(&self, ctx: &ScoringContext, stage4: &ScaledStats, totals: &SkillPoints) -> bool {
        if !self.is_active() {
            return true;
        }
        let balance = self.balance(ctx, stage4, totals);
        if self.allow_downtime {
            balance.ending() > 0.0
        } else {
            balance.deficit() <= self.tolerance
        }
    }
}
