//! Scoring context: per-run constants and the four-stage stat assembly.
//!
//! Stages:
//! 1. accumulated item stats, active set bonuses and fixed ability-tree raw
//!    bonuses
//! 2. elemental boost on the positive values of an allow-list of stats
//! 3. ability-tree proportional scaling computed from the stage 2 values
//! 4. static boosts, used for thresholds and non-combo objectives
//!
//! Combo objectives evaluate each row on stage 3 plus that row's own boosts.

use std::fmt;
use std::sync::Arc;

use gearforge_core::{
    BoostRegistry, ComboRow, GearForgeError, ScaledStats, ScoringTarget, SkillPoints, Spell,
    StatDeltas, StatId, StatVector, ValidationError, Weapon,
};

use crate::formula::{CombatFormulas, StandardFormulas};

/// Derived bonus: `output += min(max, max(0, stage2[input] * ratio))`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingRule {
    pub input: StatId,
    pub output: StatId,
    pub ratio: f64,
    pub max: f64,
}

impl ScalingRule {
    pub fn new(input: StatId, output: StatId, ratio: f64, max: f64) -> Self {
        Self {
            input,
            output,
            ratio,
            max,
        }
    }

    #[inline]
    fn contribution(&self, input_value: f64) -> f64 {
        (input_value * self.ratio).max(0.0).min(self.max)
    }
}

/// A combo row with its boost tokens resolved to stat deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub spell: Spell,
    pub quantity: f64,
    pub deltas: StatDeltas,
    /// Whether the row contributes to the damage or healing objective.
    pub scoring: bool,
}

/// Resolves the non-excluded rows of a combo against a boost registry.
pub fn resolve_combo(
    rows: &[ComboRow],
    registry: &BoostRegistry,
) -> Result<Vec<ResolvedRow>, ValidationError> {
    rows.iter()
        .filter(|row| !row.excluded)
        .map(|row| {
            Ok(ResolvedRow {
                spell: row.spell.clone(),
                quantity: row.quantity,
                deltas: registry.resolve(&row.boosts)?,
                scoring: row.is_scoring(),
            })
        })
        .collect()
}

/// Everything the scoring engine needs that is constant across candidates.
#[derive(Clone)]
pub struct ScoringContext {
    weapon: Weapon,
    target: ScoringTarget,
    atree_raw: StatVector,
    elemental_boost_pct: f64,
    scaling: Vec<ScalingRule>,
    static_boosts: StatDeltas,
    rows: Vec<ResolvedRow>,
    formulas: Arc<dyn CombatFormulas>,
}

impl fmt::Debug for ScoringContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringContext")
            .field("weapon", &self.weapon.item.name)
            .field("target", &self.target)
            .field("elemental_boost_pct", &self.elemental_boost_pct)
            .field("scaling", &self.scaling.len())
            .field("rows", &self.rows.len())
            .field("formulas", &self.formulas)
            .finish()
    }
}

impl ScoringContext {
    pub fn new(weapon: Weapon, target: ScoringTarget) -> Self {
        Self {
            weapon,
            target,
            atree_raw: StatVector::zero(),
            elemental_boost_pct: 0.0,
            scaling: Vec::new(),
            static_boosts: StatDeltas::new(),
            rows: Vec::new(),
            formulas: Arc::new(StandardFormulas),
        }
    }

    pub fn with_formulas(mut self, formulas: Arc<dyn CombatFormulas>) -> Self {
        self.formulas = formulas;
        self
    }

    pub fn with_atree_raw(mut self, raw: StatVector) -> Self {
        self.atree_raw = raw;
        self
    }

    pub fn with_elemental_boost(mut self, pct: f64) -> Self {
        self.elemental_boost_pct = pct;
        self
    }

    pub fn with_scaling_rule(mut self, rule: ScalingRule) -> Self {
        self.scaling.push(rule);
        self
    }

    pub fn with_static_boosts(mut self, boosts: StatDeltas) -> Self {
        self.static_boosts = boosts;
        self
    }

    pub fn with_rows(mut self, rows: Vec<ResolvedRow>) -> Self {
        self.rows = rows;
        self
    }

    /// Rejects contexts whose scaling could lower a stat.
    ///
    /// The fast `>=` threshold precheck relies on stages 2 and 3 never
    /// decreasing any stat.
    pub fn validate(&self) -> Result<(), GearForgeError> {
        if !(self.elemental_boost_pct >= 0.0) {
            return Err(GearForgeError::InvalidSnapshot(format!(
                "elemental boost must be non-negative, got {}",
                self.elemental_boost_pct
            )));
        }
        for rule in &self.scaling {
            if !(rule.ratio >= 0.0) || !(rule.max >= 0.0) {
                return Err(GearForgeError::InvalidSnapshot(format!(
                    "scaling rule {} -> {} has ratio {} and max {}",
                    rule.input, rule.output, rule.ratio, rule.max
                )));
            }
        }
        Ok(())
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn target(&self) -> ScoringTarget {
        self.target
    }

    pub fn atree_raw(&self) -> &StatVector {
        &self.atree_raw
    }

    pub fn rows(&self) -> &[ResolvedRow] {
        &self.rows
    }

    pub fn formulas(&self) -> &dyn CombatFormulas {
        self.formulas.as_ref()
    }

    pub fn has_damaging_rows(&self) -> bool {
        self.rows.iter().any(|r| r.scoring && r.spell.deals_damage())
    }

    /// Sum of the positive static boosts on `stat`.
    pub fn positive_static_boost(&self, stat: StatId) -> f64 {
        self.static_boosts
            .iter()
            .filter(|(id, v)| *id == stat && *v > 0.0)
            .map(|(_, v)| v)
            .sum()
    }

    /// Stage 2 multiplier for positive values of `stat`.
    pub fn elemental_factor(&self, stat: StatId) -> f64 {
        if StatId::ELEMENTAL_BOOST_ALLOW_LIST.contains(&stat) {
            1.0 + self.elemental_boost_pct / 100.0
        } else {
            1.0
        }
    }

    /// Upper bound on what stage 3 can add to `stat`.
    pub fn max_scaling_bonus(&self, stat: StatId) -> f64 {
        self.scaling
            .iter()
            .filter(|r| r.output == stat)
            .map(|r| r.max)
            .sum()
    }

    /// Assembles stages 1 to 3.
    pub fn assemble(&self, accumulated: &StatVector, set_stats: &StatVector) -> ScaledStats {
        let mut stats = accumulated.to_scaled();
        stats.add_vector(set_stats);
        stats.add_vector(&self.atree_raw);

        if self.elemental_boost_pct != 0.0 {
            let factor = 1.0 + self.elemental_boost_pct / 100.0;
            for &id in StatId::ELEMENTAL_BOOST_ALLOW_LIST {
                let v = stats[id];
                if v > 0.0 {
                    stats.set(id, v * factor);
                }
            }
        }

        if !self.scaling.is_empty() {
            let stage2 = stats.clone();
            for rule in &self.scaling {
                stats.add(rule.output, rule.contribution(stage2[rule.input]));
            }
        }
        stats
    }

    /// Stage 4: stage 3 plus static boosts.
    pub fn with_static(&self, stage3: &ScaledStats) -> ScaledStats {
        let mut stats = stage3.clone();
        stats.add_deltas(&self.static_boosts);
        stats
    }

    /// Stats one combo row is evaluated on.
    pub fn row_stats(&self, stage3: &ScaledStats, row: &ResolvedRow) -> ScaledStats {
        let mut stats = stage3.clone();
        stats.add_deltas(&row.deltas);
        stats
    }

    /// Evaluates the scoring target.
    pub fn objective(&self, stage3: &ScaledStats, stage4: &ScaledStats, totals: &SkillPoints) -> f64 {
        match self.target {
            ScoringTarget::ComboDamage => {
                let crit = self.formulas.crit_chance(totals);
                self.rows
                    .iter()
                    .filter(|r| r.scoring && r.spell.deals_damage())
                    .map(|row| {
                        let stats = self.row_stats(stage3, row);
                        self.formulas
                            .spell_damage(&stats, totals, &self.weapon, &row.spell)
                            .expected(crit)
                            * row.quantity
                    })
                    .sum()
            }
            ScoringTarget::Healing => self
                .rows
                .iter()
                .filter(|r| r.scoring && r.spell.heal_pct > 0.0)
                .map(|row| {
                    let stats = self.row_stats(stage3, row);
                    self.formulas.healing(&stats, &row.spell) * row.quantity
                })
                .sum(),
            ScoringTarget::Ehp => self.formulas.ehp(stage4, totals),
            ScoringTarget::Stat(id) => stage4[id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge_core::{AttackSpeed, Element, Item, ItemCategory};

    fn weapon() -> Weapon {
        Weapon::new(Item::new("Staff", ItemCategory::Weapon), AttackSpeed::Normal)
            .with_damage(Element::Water, 90.0, 110.0)
    }

    fn bolt() -> Spell {
        Spell::new("Bolt", 1, 30.0).with_conversion([0.0, 0.0, 0.0, 100.0, 0.0, 0.0])
    }

    #[test]
    fn test_stage_order() {
        let ctx = ScoringContext::new(weapon(), ScoringTarget::Stat(StatId::ManaRegen))
            .with_atree_raw(StatVector::from_pairs([(StatId::SpellDamagePct, 10)]))
            .with_elemental_boost(50.0)
            .with_scaling_rule(ScalingRule::new(StatId::SpellDamagePct, StatId::ManaRegen, 0.5, 100.0))
            .with_static_boosts(vec![(StatId::ManaRegen, 3.0)]);

        let acc = StatVector::from_pairs([(StatId::SpellDamagePct, 10), (StatId::Hp, 100)]);
        let sets = StatVector::zero();
        let stage3 = ctx.assemble(&acc, &sets);
        // (10 + 10) * 1.5 = 30, hp is not boosted
        assert_eq!(stage3[StatId::SpellDamagePct], 30.0);
        assert_eq!(stage3[StatId::Hp], 100.0);
        assert_eq!(stage3[StatId::ManaRegen], 15.0);

        let stage4 = ctx.with_static(&stage3);
        assert_eq!(stage4[StatId::ManaRegen], 18.0);
        assert_eq!(ctx.objective(&stage3, &stage4, &SkillPoints::ZERO), 18.0);
    }

    #[test]
    fn test_elemental_boost_skips_negative_values() {
        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage).with_elemental_boost(30.0);
        let acc = StatVector::from_pairs([(StatId::FireDamagePct, -20), (StatId::WaterDamagePct, 10)]);
        let stage3 = ctx.assemble(&acc, &StatVector::zero());
        assert_eq!(stage3[StatId::FireDamagePct], -20.0);
        assert_eq!(stage3[StatId::WaterDamagePct], 13.0);
    }

    #[test]
    fn test_scaling_never_decreases_stats() {
        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage)
            .with_scaling_rule(ScalingRule::new(StatId::ManaRegen, StatId::SpellDamageRaw, 2.0, 40.0));
        for mr in [-50, -1, 0, 1, 10, 50] {
            let acc = StatVector::from_pairs([(StatId::ManaRegen, mr), (StatId::SpellDamageRaw, 7)]);
            let stage3 = ctx.assemble(&acc, &StatVector::zero());
            assert!(stage3[StatId::SpellDamageRaw] >= 7.0);
            assert!(stage3[StatId::SpellDamageRaw] <= 47.0);
        }
    }

    #[test]
    fn test_negative_ratio_is_rejected() {
        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage)
            .with_scaling_rule(ScalingRule::new(StatId::ManaRegen, StatId::Hp, -1.0, 10.0));
        assert!(matches!(ctx.validate(), Err(GearForgeError::InvalidSnapshot(_))));

        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage).with_elemental_boost(-5.0);
        assert!(ctx.validate().is_err());

        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage)
            .with_scaling_rule(ScalingRule::new(StatId::ManaRegen, StatId::Hp, 1.0, 10.0));
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_combo_damage_uses_row_boosts() {
        let registry = BoostRegistry::new().with_boost("Surge", vec![(StatId::SpellDamagePct, 100.0)]);
        let rows = [
            ComboRow::new(bolt(), 1.0),
            ComboRow::new(bolt(), 1.0).with_boost("Surge"),
            ComboRow::new(bolt(), 5.0).excluded(),
        ];
        let resolved = resolve_combo(&rows, &registry).unwrap();
        assert_eq!(resolved.len(), 2);

        let ctx = ScoringContext::new(weapon(), ScoringTarget::ComboDamage).with_rows(resolved);
        assert!(ctx.has_damaging_rows());
        let stage3 = ctx.assemble(&StatVector::zero(), &StatVector::zero());
        let stage4 = ctx.with_static(&stage3);
        let score = ctx.objective(&stage3, &stage4, &SkillPoints::ZERO);
        // one plain cast of 100 plus one cast at double damage
        assert!((score - 300.0).abs() < 1e-6);

        let unboosted = ScoringContext::new(weapon(), ScoringTarget::ComboDamage)
            .with_rows(resolve_combo(&rows[..1], &registry).unwrap());
        let single = unboosted.objective(&stage3, &stage4, &SkillPoints::ZERO);
        assert!((score - 3.0 * single).abs() < 1e-6);
    }

    #[test]
    fn test_strength_raises_fixture_combo_damage() {
        let registry = BoostRegistry::new().with_boost("Surge", vec![(StatId::DamagePct, 30.0)]);
        let rows = resolve_combo(&gearforge_test::bolt_combo(), &registry).unwrap();
        let ctx = ScoringContext::new(gearforge_test::test_weapon(), ScoringTarget::ComboDamage)
            .with_rows(rows);
        let stage3 = ctx.assemble(&StatVector::zero(), &StatVector::zero());
        let stage4 = ctx.with_static(&stage3);

        let weak = ctx.objective(&stage3, &stage4, &SkillPoints::ZERO);
        let strong = ctx.objective(&stage3, &stage4, &SkillPoints::new([50, 0, 0, 0, 0]));
        let lucky = ctx.objective(&stage3, &stage4, &SkillPoints::new([0, 50, 0, 0, 0]));
        assert!(strong > weak);
        assert!(lucky > weak);
    }

    #[test]
    fn test_unknown_boost_token() {
        let rows = [ComboRow::new(bolt(), 1.0).with_boost("Missing")];
        assert_eq!(
            resolve_combo(&rows, &BoostRegistry::new()).unwrap_err(),
            ValidationError::UnknownBoostToken("Missing".into())
        );
    }
}
