//! Weapons and damage elements.

use crate::item::{Item, ItemCategory};
use crate::stat::StatId;

/// Damage element; `Neutral` has no element-specific stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Element {
    Neutral,
    Earth,
    Thunder,
    Water,
    Fire,
    Air,
}

impl Element {
    pub const ALL: [Element; 6] = [
        Element::Neutral,
        Element::Earth,
        Element::Thunder,
        Element::Water,
        Element::Fire,
        Element::Air,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The `%` damage stat boosting this element.
    pub fn damage_pct_stat(self) -> Option<StatId> {
        match self {
            Element::Neutral => None,
            Element::Earth => Some(StatId::EarthDamagePct),
            Element::Thunder => Some(StatId::ThunderDamagePct),
            Element::Water => Some(StatId::WaterDamagePct),
            Element::Fire => Some(StatId::FireDamagePct),
            Element::Air => Some(StatId::AirDamagePct),
        }
    }
}

/// Inclusive damage range of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

impl DamageRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Attack speed tier of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttackSpeed {
    SuperSlow,
    VerySlow,
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
    SuperFast,
}

impl AttackSpeed {
    const TIERS: [AttackSpeed; 7] = [
        AttackSpeed::SuperSlow,
        AttackSpeed::VerySlow,
        AttackSpeed::Slow,
        AttackSpeed::Normal,
        AttackSpeed::Fast,
        AttackSpeed::VeryFast,
        AttackSpeed::SuperFast,
    ];

    /// Spell damage multiplier normalizing slow and fast weapons.
    pub fn spell_multiplier(self) -> f64 {
        match self {
            AttackSpeed::SuperSlow => 2.05,
            AttackSpeed::VerySlow => 2.5,
            AttackSpeed::Slow => 1.8,
            AttackSpeed::Normal => 1.0,
            AttackSpeed::Fast => 0.83,
            AttackSpeed::VeryFast => 0.5,
            AttackSpeed::SuperFast => 0.51,
        }
    }

    /// Shifts the tier by an attack speed bonus, saturating at both ends.
    pub fn shifted(self, tiers: i64) -> AttackSpeed {
        let idx = Self::TIERS.iter().position(|t| *t == self).unwrap_or(3) as i64;
        let shifted = (idx + tiers).clamp(0, Self::TIERS.len() as i64 - 1);
        Self::TIERS[shifted as usize]
    }
}

/// The fixed weapon of a search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub item: Item,
    /// Base damage per [`Element`], indexed by `Element::index`.
    pub damages: [DamageRange; 6],
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_speed: AttackSpeed,
}

impl Weapon {
    pub fn new(item: Item, attack_speed: AttackSpeed) -> Self {
        debug_assert_eq!(item.category, ItemCategory::Weapon);
        Self {
            item,
            damages: [DamageRange::default(); 6],
            attack_speed,
        }
    }

    pub fn with_damage(mut self, element: Element, min: f64, max: f64) -> Self {
        self.damages[element.index()] = DamageRange::new(min, max);
        self
    }

    pub fn damage(&self, element: Element) -> DamageRange {
        self.damages[element.index()]
    }

    /// Sum of average damage across all elements.
    pub fn total_average(&self) -> f64 {
        self.damages.iter().map(DamageRange::average).sum()
    }
}
