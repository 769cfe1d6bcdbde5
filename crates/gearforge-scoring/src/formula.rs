//! Combat formulas consumed as a pure scoring oracle.
//!
//! The search only needs spell damage, spell cost and effective health for a
//! stat snapshot. [`CombatFormulas`] is the seam; [`StandardFormulas`] is the
//! built-in rule set.

use std::fmt::Debug;

use gearforge_core::{
    skill_point_pct, Attribute, Element, ScaledStats, SkillPoints, Spell, StatId, Weapon,
};

/// Starting mana pool before `maxMana`.
pub const BASE_MANA: f64 = 100.0;

/// Mana regenerated per second before `mr`.
pub const BASE_MANA_PER_SECOND: f64 = 1.0;

/// Non-crit and crit damage totals of one spell cast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpellDamage {
    pub non_crit: f64,
    pub crit: f64,
}

impl SpellDamage {
    /// Damage expected for a given crit chance in `[0, 1]`.
    pub fn expected(&self, crit_chance: f64) -> f64 {
        let c = crit_chance.clamp(0.0, 1.0);
        self.non_crit * (1.0 - c) + self.crit * c
    }
}

/// Formulas evaluated at search leaves.
pub trait CombatFormulas: Send + Sync + Debug {
    /// Damage of one cast of `spell` under `stats` and skill-point `totals`.
    fn spell_damage(
        &self,
        stats: &ScaledStats,
        totals: &SkillPoints,
        weapon: &Weapon,
        spell: &Spell,
    ) -> SpellDamage;

    /// Probability in `[0, 1]` that a cast crits.
    fn crit_chance(&self, totals: &SkillPoints) -> f64;

    /// Mana cost of one cast of `spell`.
    fn spell_cost(&self, stats: &ScaledStats, totals: &SkillPoints, spell: &Spell) -> f64;

    /// Effective health.
    fn ehp(&self, stats: &ScaledStats, totals: &SkillPoints) -> f64;

    /// Health restored by one cast of a healing spell.
    fn healing(&self, stats: &ScaledStats, spell: &Spell) -> f64 {
        let hp = total_health(stats);
        hp * spell.heal_pct / 100.0 * (1.0 + stats[StatId::HealPct] / 100.0)
    }
}

/// Health pool of a snapshot, floored at 5.
pub fn total_health(stats: &ScaledStats) -> f64 {
    (stats[StatId::Hp] + stats[StatId::HpBonus]).max(5.0)
}

/// The built-in rule set.
///
/// - Strength adds its skill-point percentage to all damage.
/// - Dexterity's percentage is the crit chance.
/// - Intelligence reduces spell cost by its percentage.
/// - Defense reduces incoming damage by its percentage.
/// - Agility dodges incoming damage at 95% of its percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormulas;

impl StandardFormulas {
    pub fn new() -> Self {
        Self
    }
}

impl CombatFormulas for StandardFormulas {
    fn spell_damage(
        &self,
        stats: &ScaledStats,
        totals: &SkillPoints,
        weapon: &Weapon,
        spell: &Spell,
    ) -> SpellDamage {
        let speed = weapon
            .attack_speed
            .shifted(stats[StatId::AttackSpeedBonus].round() as i64)
            .spell_multiplier();
        let strength = skill_point_pct(totals[Attribute::Strength]);
        let shared = stats[StatId::SpellDamagePct] + stats[StatId::DamagePct] + strength;

        let conversion_total: f64 = spell.conversion.iter().sum();
        let weapon_avg = weapon.total_average();
        let mut non_crit = 0.0;
        for element in Element::ALL {
            let conv = spell.conversion[element.index()];
            if conv <= 0.0 {
                continue;
            }
            let elem_pct = element.damage_pct_stat().map(|s| stats[s]).unwrap_or(0.0);
            let base = weapon_avg * conv / 100.0 * speed;
            let flat = (stats[StatId::SpellDamageRaw] + stats[StatId::DamageRaw])
                * (conv / conversion_total);
            non_crit += (base * (1.0 + (shared + elem_pct) / 100.0)).max(0.0) + flat.max(0.0);
        }

        let crit = non_crit * (2.0 + stats[StatId::CritDamagePct] / 100.0);
        SpellDamage { non_crit, crit }
    }

    fn crit_chance(&self, totals: &SkillPoints) -> f64 {
        skill_point_pct(totals[Attribute::Dexterity]) / 100.0
    }

    fn spell_cost(&self, stats: &ScaledStats, totals: &SkillPoints, spell: &Spell) -> f64 {
        let raw = StatId::spell_cost_raw(spell.slot).map(|s| stats[s]).unwrap_or(0.0);
        let pct = StatId::spell_cost_pct(spell.slot).map(|s| stats[s]).unwrap_or(0.0);
        let int = skill_point_pct(totals[Attribute::Intelligence]);
        let cost = (spell.base_cost + raw) * (1.0 + pct / 100.0) * (1.0 - int / 100.0);
        cost.max(1.0)
    }

    fn ehp(&self, stats: &ScaledStats, totals: &SkillPoints) -> f64 {
        let hp = total_health(stats);
        let def = skill_point_pct(totals[Attribute::Defense]) / 100.0;
        let agi = 0.95 * skill_point_pct(totals[Attribute::Agility]) / 100.0;
        hp / ((1.0 - def) * (1.0 - agi))
    }
}
