//! Ability combos, boost tokens and scoring targets.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::stat::StatId;

/// Description of one castable spell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub name: String,
    /// Spell slot 1..=4; selects the `spRaw`/`spPct` cost modifiers.
    pub slot: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_cost: f64,
    /// Percent of weapon damage converted per element, indexed by `Element::index`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub conversion: [f64; 6],
    /// Percent of total health restored per cast.
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_pct: f64,
}

impl Spell {
    pub fn new(name: impl Into<String>, slot: u8, base_cost: f64) -> Self {
        Self {
            name: name.into(),
            slot,
            base_cost,
            conversion: [0.0; 6],
            heal_pct: 0.0,
        }
    }

    pub fn with_conversion(mut self, conversion: [f64; 6]) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn with_heal(mut self, heal_pct: f64) -> Self {
        self.heal_pct = heal_pct;
        self
    }

    pub fn deals_damage(&self) -> bool {
        self.conversion.iter().any(|&c| c > 0.0)
    }
}

/// One entry of the user's ability sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboRow {
    pub spell: Spell,
    pub quantity: f64,
    /// Boost tokens active only while this row is evaluated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub boosts: Vec<String>,
    /// Excluded rows are neither scored nor charged mana.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded: bool,
}

impl ComboRow {
    pub fn new(spell: Spell, quantity: f64) -> Self {
        Self {
            spell,
            quantity,
            boosts: Vec::new(),
            excluded: false,
        }
    }

    pub fn with_boost(mut self, token: impl Into<String>) -> Self {
        self.boosts.push(token.into());
        self
    }

    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// Rows that contribute to the objective: not excluded, non-zero quantity,
    /// and either dealing damage or healing.
    pub fn is_scoring(&self) -> bool {
        !self.excluded && self.quantity > 0.0 && (self.spell.deals_damage() || self.spell.heal_pct > 0.0)
    }
}

/// Sparse floating-point stat deltas.
pub type StatDeltas = Vec<(StatId, f64)>;

/// Boost tokens resolved from the ability tree, keyed by token name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoostRegistry {
    boosts: HashMap<String, StatDeltas>,
}

impl BoostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boost(mut self, token: impl Into<String>, deltas: StatDeltas) -> Self {
        self.boosts.insert(token.into(), deltas);
        self
    }

    pub fn get(&self, token: &str) -> Option<&StatDeltas> {
        self.boosts.get(token)
    }

    /// Merges the deltas of `tokens` into one list.
    pub fn resolve(&self, tokens: &[String]) -> Result<StatDeltas, ValidationError> {
        let mut out = StatDeltas::new();
        for token in tokens {
            let deltas = self
                .get(token)
                .ok_or_else(|| ValidationError::UnknownBoostToken(token.clone()))?;
            out.extend_from_slice(deltas);
        }
        Ok(out)
    }
}

/// The objective a search maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoringTarget {
    /// Expected damage of one pass through the combo.
    #[default]
    ComboDamage,
    /// Total expected healing of one pass through the combo.
    Healing,
    /// Effective health.
    Ehp,
    /// A single named stat of the final snapshot.
    Stat(StatId),
}
