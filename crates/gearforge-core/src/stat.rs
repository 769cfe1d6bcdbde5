//! Closed stat identifiers and dense stat vectors.
//!
//! Every additive stat an item, set bonus, tome or ability-tree node can carry
//! is a variant of [`StatId`]. Stat tables are stored as dense arrays indexed by
//! that enum: [`StatVector`] holds the integer contributions accumulated during
//! search, [`ScaledStats`] the floating-point snapshot assembled at a leaf.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, SubAssign};
use std::str::FromStr;

use crate::error::GearForgeError;

macro_rules! stat_ids {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Identifier of one additive stat.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum StatId {
            $($variant),+
        }

        impl StatId {
            /// All stat identifiers in index order.
            pub const ALL: &'static [StatId] = &[$(StatId::$variant),+];

            /// Number of distinct stats.
            pub const COUNT: usize = Self::ALL.len();

            /// Returns the catalog key of this stat.
            pub fn name(self) -> &'static str {
                match self {
                    $(StatId::$variant => $name),+
                }
            }

            /// Looks up a stat by its catalog key.
            pub fn from_name(name: &str) -> Option<StatId> {
                match name {
                    $($name => Some(StatId::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

stat_ids! {
    Hp => "hp",
    HpBonus => "hpBonus",
    HealthRegenRaw => "hprRaw",
    HealthRegenPct => "hprPct",
    ManaRegen => "mr",
    ManaSteal => "ms",
    MaxMana => "maxMana",
    LifeSteal => "ls",
    SpellDamageRaw => "sdRaw",
    SpellDamagePct => "sdPct",
    MeleeDamageRaw => "mdRaw",
    MeleeDamagePct => "mdPct",
    DamageRaw => "damRaw",
    DamagePct => "damPct",
    EarthDamagePct => "eDamPct",
    ThunderDamagePct => "tDamPct",
    WaterDamagePct => "wDamPct",
    FireDamagePct => "fDamPct",
    AirDamagePct => "aDamPct",
    EarthDefense => "eDef",
    ThunderDefense => "tDef",
    WaterDefense => "wDef",
    FireDefense => "fDef",
    AirDefense => "aDef",
    CritDamagePct => "critDamPct",
    HealPct => "healPct",
    WalkSpeed => "spd",
    AttackSpeedBonus => "atkTier",
    Poison => "poison",
    Thorns => "thorns",
    Reflection => "ref",
    Exploding => "expd",
    Spell1CostRaw => "spRaw1",
    Spell2CostRaw => "spRaw2",
    Spell3CostRaw => "spRaw3",
    Spell4CostRaw => "spRaw4",
    Spell1CostPct => "spPct1",
    Spell2CostPct => "spPct2",
    Spell3CostPct => "spPct3",
    Spell4CostPct => "spPct4",
}

impl StatId {
    /// Dense index of this stat.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stats scaled by the elemental (radiance-style) boost.
    pub const ELEMENTAL_BOOST_ALLOW_LIST: &'static [StatId] = &[
        StatId::SpellDamageRaw,
        StatId::SpellDamagePct,
        StatId::MeleeDamageRaw,
        StatId::MeleeDamagePct,
        StatId::DamageRaw,
        StatId::DamagePct,
        StatId::EarthDamagePct,
        StatId::ThunderDamagePct,
        StatId::WaterDamagePct,
        StatId::FireDamagePct,
        StatId::AirDamagePct,
        StatId::EarthDefense,
        StatId::ThunderDefense,
        StatId::WaterDefense,
        StatId::FireDefense,
        StatId::AirDefense,
        StatId::ManaRegen,
        StatId::ManaSteal,
        StatId::LifeSteal,
        StatId::HealthRegenRaw,
        StatId::HealthRegenPct,
    ];

    /// Raw spell cost modifier for spell slot `n` (1-based).
    pub fn spell_cost_raw(n: u8) -> Option<StatId> {
        match n {
            1 => Some(StatId::Spell1CostRaw),
            2 => Some(StatId::Spell2CostRaw),
            3 => Some(StatId::Spell3CostRaw),
            4 => Some(StatId::Spell4CostRaw),
            _ => None,
        }
    }

    /// Percent spell cost modifier for spell slot `n` (1-based).
    pub fn spell_cost_pct(n: u8) -> Option<StatId> {
        match n {
            1 => Some(StatId::Spell1CostPct),
            2 => Some(StatId::Spell2CostPct),
            3 => Some(StatId::Spell3CostPct),
            4 => Some(StatId::Spell4CostPct),
            _ => None,
        }
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatId {
    type Err = GearForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatId::from_name(s).ok_or_else(|| GearForgeError::UnknownStat(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StatId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        StatId::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown stat '{name}'")))
    }
}

/// Dense integer stat table.
///
/// Item stats are whole numbers, so accumulating and removing contributions
/// in any order is exact.
///
/// # Example
///
/// ```
/// use gearforge_core::stat::{StatId, StatVector};
///
/// let mut running = StatVector::zero();
/// let helmet = StatVector::from_pairs([(StatId::Hp, 500), (StatId::ManaRegen, 4)]);
///
/// running += &helmet;
/// assert_eq!(running[StatId::Hp], 500);
///
/// running -= &helmet;
/// assert!(running.is_zero());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StatVector([i64; StatId::COUNT]);

impl StatVector {
    /// Returns a table with every stat at zero.
    pub const fn zero() -> Self {
        Self([0; StatId::COUNT])
    }

    /// Builds a table from `(stat, value)` pairs; repeated stats are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (StatId, i64)>) -> Self {
        let mut v = Self::zero();
        for (id, value) in pairs {
            v.0[id.index()] += value;
        }
        v
    }

    #[inline]
    pub fn get(&self, id: StatId) -> i64 {
        self.0[id.index()]
    }

    #[inline]
    pub fn set(&mut self, id: StatId, value: i64) {
        self.0[id.index()] = value;
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// Iterates over the non-zero entries.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (StatId, i64)> + '_ {
        StatId::ALL
            .iter()
            .map(|&id| (id, self.0[id.index()]))
            .filter(|&(_, v)| v != 0)
    }

    /// Converts to a floating-point table.
    pub fn to_scaled(&self) -> ScaledStats {
        let mut out = ScaledStats::zero();
        for (slot, &v) in out.0.iter_mut().zip(self.0.iter()) {
            *slot = v as f64;
        }
        out
    }
}

impl Default for StatVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for StatVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter_nonzero().map(|(id, v)| (id.name(), v)))
            .finish()
    }
}

impl Index<StatId> for StatVector {
    type Output = i64;

    fn index(&self, id: StatId) -> &i64 {
        &self.0[id.index()]
    }
}

impl IndexMut<StatId> for StatVector {
    fn index_mut(&mut self, id: StatId) -> &mut i64 {
        &mut self.0[id.index()]
    }
}

impl AddAssign<&StatVector> for StatVector {
    #[inline]
    fn add_assign(&mut self, rhs: &StatVector) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += *b;
        }
    }
}

impl SubAssign<&StatVector> for StatVector {
    #[inline]
    fn sub_assign(&mut self, rhs: &StatVector) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= *b;
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let entries: Vec<(StatId, i64)> = self.iter_nonzero().collect();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (id, v) in entries {
            map.serialize_entry(id.name(), &v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StatVector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = std::collections::BTreeMap::<StatId, i64>::deserialize(deserializer)?;
        Ok(StatVector::from_pairs(raw))
    }
}

/// Dense floating-point stat table produced by the scaling stages.
#[derive(Clone, PartialEq)]
pub struct ScaledStats([f64; StatId::COUNT]);

impl ScaledStats {
    pub const fn zero() -> Self {
        Self([0.0; StatId::COUNT])
    }

    #[inline]
    pub fn get(&self, id: StatId) -> f64 {
        self.0[id.index()]
    }

    #[inline]
    pub fn set(&mut self, id: StatId, value: f64) {
        self.0[id.index()] = value;
    }

    #[inline]
    pub fn add(&mut self, id: StatId, value: f64) {
        self.0[id.index()] += value;
    }

    /// Adds every entry of an integer table.
    pub fn add_vector(&mut self, v: &StatVector) {
        for (a, &b) in self.0.iter_mut().zip(v.0.iter()) {
            *a += b as f64;
        }
    }

    /// Adds a sparse list of deltas.
    pub fn add_deltas(&mut self, deltas: &[(StatId, f64)]) {
        for &(id, value) in deltas {
            self.0[id.index()] += value;
        }
    }
}

impl Default for ScaledStats {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for ScaledStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                StatId::ALL
                    .iter()
                    .filter(|id| self.get(**id) != 0.0)
                    .map(|id| (id.name(), self.get(*id))),
            )
            .finish()
    }
}

impl Index<StatId> for ScaledStats {
    type Output = f64;

    fn index(&self, id: StatId) -> &f64 {
        &self.0[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for &id in StatId::ALL {
            assert_eq!(StatId::from_name(id.name()), Some(id));
        }
        assert_eq!(StatId::from_name("nope"), None);
        assert!("sdPct".parse::<StatId>().is_ok());
        assert!(matches!(
            "bogus".parse::<StatId>(),
            Err(GearForgeError::UnknownStat(_))
        ));
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, id) in StatId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_from_pairs_sums_duplicates() {
        let v = StatVector::from_pairs([(StatId::Hp, 10), (StatId::Hp, 5), (StatId::ManaRegen, -3)]);
        assert_eq!(v[StatId::Hp], 15);
        assert_eq!(v[StatId::ManaRegen], -3);
        assert_eq!(v.iter_nonzero().count(), 2);
    }

    #[test]
    fn test_spell_cost_lookup() {
        assert_eq!(StatId::spell_cost_raw(3), Some(StatId::Spell3CostRaw));
        assert_eq!(StatId::spell_cost_pct(1), Some(StatId::Spell1CostPct));
        assert_eq!(StatId::spell_cost_pct(0), None);
    }

    #[test]
    fn test_scaled_conversion() {
        let v = StatVector::from_pairs([(StatId::SpellDamagePct, 20)]);
        let mut s = v.to_scaled();
        s.add(StatId::SpellDamagePct, 0.5);
        assert_eq!(s[StatId::SpellDamagePct], 20.5);
        assert_eq!(s[StatId::Hp], 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_map_format() {
        let v: StatVector = serde_json::from_str(r#"{"hp": 120, "sdPct": 7}"#).unwrap();
        assert_eq!(v[StatId::Hp], 120);
        assert_eq!(v[StatId::SpellDamagePct], 7);
        assert!(serde_json::from_str::<StatVector>(r#"{"nope": 1}"#).is_err());
    }
}
