//! Items, equipment slots and item sets.

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::skill::{Attribute, SkillPoints};
use crate::stat::{StatId, StatVector};

/// Name carried by the sentinel item representing an empty slot.
pub const NONE_ITEM_NAME: &str = "NONE";

/// Catalog category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ItemCategory {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
    Ring,
    Bracelet,
    Necklace,
    Weapon,
    Tome,
}

impl ItemCategory {
    /// Categories that are searched; both ring slots share [`ItemCategory::Ring`].
    pub const SEARCHABLE: [ItemCategory; 7] = [
        ItemCategory::Helmet,
        ItemCategory::Chestplate,
        ItemCategory::Leggings,
        ItemCategory::Boots,
        ItemCategory::Ring,
        ItemCategory::Bracelet,
        ItemCategory::Necklace,
    ];
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemCategory::Helmet => "helmet",
            ItemCategory::Chestplate => "chestplate",
            ItemCategory::Leggings => "leggings",
            ItemCategory::Boots => "boots",
            ItemCategory::Ring => "ring",
            ItemCategory::Bracelet => "bracelet",
            ItemCategory::Necklace => "necklace",
            ItemCategory::Weapon => "weapon",
            ItemCategory::Tome => "tome",
        };
        f.write_str(s)
    }
}

/// One of the eight searched equipment positions, in game equip order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Slot {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
    Ring1,
    Ring2,
    Bracelet,
    Necklace,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::Helmet,
        Slot::Chestplate,
        Slot::Leggings,
        Slot::Boots,
        Slot::Ring1,
        Slot::Ring2,
        Slot::Bracelet,
        Slot::Necklace,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn category(self) -> ItemCategory {
        match self {
            Slot::Helmet => ItemCategory::Helmet,
            Slot::Chestplate => ItemCategory::Chestplate,
            Slot::Leggings => ItemCategory::Leggings,
            Slot::Boots => ItemCategory::Boots,
            Slot::Ring1 | Slot::Ring2 => ItemCategory::Ring,
            Slot::Bracelet => ItemCategory::Bracelet,
            Slot::Necklace => ItemCategory::Necklace,
        }
    }

    pub fn is_ring(self) -> bool {
        matches!(self, Slot::Ring1 | Slot::Ring2)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Ring1 => f.write_str("ring1"),
            Slot::Ring2 => f.write_str("ring2"),
            other => write!(f, "{}", other.category()),
        }
    }
}

/// How a rolled-stat range collapses to one effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RollMode {
    #[default]
    Max,
    Min,
    Average,
}

impl RollMode {
    pub fn resolve(self, min: i64, max: i64) -> i64 {
        match self {
            RollMode::Max => max,
            RollMode::Min => min,
            // round half away from zero
            RollMode::Average => {
                let sum = min + max;
                if sum >= 0 {
                    (sum + 1) / 2
                } else {
                    (sum - 1) / 2
                }
            }
        }
    }
}

/// A stat whose value is rolled within a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RolledStat {
    pub stat: StatId,
    pub min: i64,
    pub max: i64,
}

/// An immutable equipment item.
///
/// `rolled_effective` holds the rolled stats collapsed by the active
/// [`RollMode`]; it is filled in by [`Item::apply_roll_mode`] when pools are
/// built and is what the search accumulates alongside `static_stats`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    pub category: ItemCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: SkillPoints,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_points: SkillPoints,
    #[cfg_attr(feature = "serde", serde(default))]
    pub static_stats: StatVector,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rolled: Vec<RolledStat>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub rolled_effective: StatVector,
    #[cfg_attr(feature = "serde", serde(default))]
    pub set_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub illegal_at_two: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub major_ids: SmallVec<[String; 2]>,
}

impl Item {
    /// Creates an item with no stats, requirements or set.
    pub fn new(name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            name: name.into(),
            category,
            level: 1,
            requirements: SkillPoints::ZERO,
            skill_points: SkillPoints::ZERO,
            static_stats: StatVector::zero(),
            rolled: Vec::new(),
            rolled_effective: StatVector::zero(),
            set_name: None,
            illegal_at_two: false,
            major_ids: SmallVec::new(),
        }
    }

    /// The sentinel empty-slot item.
    pub fn none(category: ItemCategory) -> Self {
        Self::new(NONE_ITEM_NAME, category)
    }

    pub fn is_none(&self) -> bool {
        self.name == NONE_ITEM_NAME
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_stat(mut self, stat: StatId, value: i64) -> Self {
        self.static_stats[stat] += value;
        self
    }

    pub fn with_rolled(mut self, stat: StatId, min: i64, max: i64) -> Self {
        self.rolled.push(RolledStat { stat, min, max });
        self
    }

    pub fn with_requirement(mut self, attribute: Attribute, value: i32) -> Self {
        self.requirements[attribute] = value;
        self
    }

    pub fn with_skill_bonus(mut self, attribute: Attribute, value: i32) -> Self {
        self.skill_points[attribute] = value;
        self
    }

    pub fn with_set(mut self, set_name: impl Into<String>) -> Self {
        self.set_name = Some(set_name.into());
        self
    }

    pub fn with_major_id(mut self, id: impl Into<String>) -> Self {
        self.major_ids.push(id.into());
        self
    }

    /// Collapses the rolled-stat table into `rolled_effective`.
    pub fn apply_roll_mode(&mut self, mode: RollMode) {
        let mut effective = StatVector::zero();
        for r in &self.rolled {
            effective[r.stat] += mode.resolve(r.min, r.max);
        }
        self.rolled_effective = effective;
    }

    /// Effective value of one stat (static plus collapsed roll).
    pub fn stat(&self, stat: StatId) -> i64 {
        self.static_stats[stat] + self.rolled_effective[stat]
    }

    /// True if the item needs any points in `attribute`.
    pub fn requires(&self, attribute: Attribute) -> bool {
        self.requirements[attribute] > 0
    }
}

/// Bonus granted by a set for one equipped-piece count.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetBonus {
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: StatVector,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_points: SkillPoints,
    /// The game forbids this piece count.
    #[cfg_attr(feature = "serde", serde(default))]
    pub illegal: bool,
}

/// An item set; `bonuses[k - 1]` applies with `k` distinct pieces equipped.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSet {
    pub name: String,
    pub bonuses: Vec<SetBonus>,
}

impl ItemSet {
    pub fn new(name: impl Into<String>, bonuses: Vec<SetBonus>) -> Self {
        Self {
            name: name.into(),
            bonuses,
        }
    }

    /// Bonus for `count` distinct pieces; `None` for zero pieces or past the table.
    pub fn bonus_for(&self, count: usize) -> Option<&SetBonus> {
        count.checked_sub(1).and_then(|i| self.bonuses.get(i))
    }

    /// Equipping two distinct members of this set is forbidden.
    pub fn is_illegal_at_two(&self) -> bool {
        self.bonus_for(2).is_some_and(|b| b.illegal)
    }

    /// Per-attribute maximum positive skill-point bonus over all tiers.
    pub fn optimistic_skill_points(&self) -> SkillPoints {
        self.bonuses
            .iter()
            .fold(SkillPoints::ZERO, |acc, b| acc.max(&b.skill_points))
    }

    /// Maximum positive bonus to `stat` over all tiers.
    pub fn optimistic_stat(&self, stat: StatId) -> i64 {
        self.bonuses
            .iter()
            .map(|b| b.stats[stat])
            .max()
            .unwrap_or(0)
            .max(0)
    }
}

/// All known item sets keyed by name.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SetCatalog {
    sets: HashMap<String, ItemSet>,
}

impl SetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: ItemSet) {
        self.sets.insert(set.name.clone(), set);
    }

    pub fn with_set(mut self, set: ItemSet) -> Self {
        self.insert(set);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ItemSet> {
        self.sets.get(name)
    }

    pub fn is_illegal_at_two(&self, name: &str) -> bool {
        self.get(name).is_some_and(ItemSet::is_illegal_at_two)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemSet> {
        self.sets.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_mode_resolution() {
        assert_eq!(RollMode::Max.resolve(3, 10), 10);
        assert_eq!(RollMode::Min.resolve(3, 10), 3);
        assert_eq!(RollMode::Average.resolve(3, 10), 7);
        assert_eq!(RollMode::Average.resolve(-10, -3), -7);
        assert_eq!(RollMode::Average.resolve(4, 4), 4);
    }

    #[test]
    fn test_apply_roll_mode_replaces_previous_roll() {
        let mut item = Item::new("Visor", ItemCategory::Helmet)
            .with_stat(StatId::Hp, 300)
            .with_rolled(StatId::ManaRegen, 2, 6);
        item.apply_roll_mode(RollMode::Max);
        assert_eq!(item.stat(StatId::ManaRegen), 6);
        item.apply_roll_mode(RollMode::Min);
        assert_eq!(item.stat(StatId::ManaRegen), 2);
        assert_eq!(item.stat(StatId::Hp), 300);
    }

    #[test]
    fn test_slot_categories() {
        assert_eq!(Slot::Ring1.category(), ItemCategory::Ring);
        assert_eq!(Slot::Ring2.category(), ItemCategory::Ring);
        assert_eq!(Slot::Necklace.category(), ItemCategory::Necklace);
        assert_eq!(Slot::Ring2.to_string(), "ring2");
        assert_eq!(Slot::Boots.to_string(), "boots");
    }

    #[test]
    fn test_set_tiers() {
        let set = ItemSet::new(
            "Twin",
            vec![
                SetBonus::default(),
                SetBonus {
                    skill_points: SkillPoints::new([5, 0, -2, 0, 0]),
                    stats: StatVector::from_pairs([(StatId::Hp, 100)]),
                    illegal: true,
                },
            ],
        );
        assert!(set.bonus_for(0).is_none());
        assert!(set.bonus_for(1).is_some());
        assert!(set.bonus_for(3).is_none());
        assert!(set.is_illegal_at_two());
        assert_eq!(set.optimistic_skill_points().0, [5, 0, 0, 0, 0]);
        assert_eq!(set.optimistic_stat(StatId::Hp), 100);
        assert_eq!(set.optimistic_stat(StatId::ManaRegen), 0);

        let catalog = SetCatalog::new().with_set(set);
        assert!(catalog.is_illegal_at_two("Twin"));
        assert!(!catalog.is_illegal_at_two("Other"));
    }

    #[test]
    fn test_none_item() {
        let none = Item::none(ItemCategory::Ring);
        assert!(none.is_none());
        assert!(none.static_stats.is_zero());
        assert!(!Item::new("Ring of Power", ItemCategory::Ring).is_none());
    }
}
