//! Running stat accumulator.
//!
//! The search backtracks over item placements; each placement calls
//! [`StatAccumulator::add`] and each backtrack the matching
//! [`StatAccumulator::remove`]. Only additive contributions are accumulated.
//! Set bonuses and scaling depend on the complete assignment and are computed
//! once per leaf instead.

use gearforge_core::{Item, SkillPoints, StatVector};

/// Sum of the additive contributions of every currently placed item.
///
/// # Example
///
/// ```
/// use gearforge_core::{Item, ItemCategory, StatId};
/// use gearforge_scoring::StatAccumulator;
///
/// let helmet = Item::new("Cap", ItemCategory::Helmet).with_stat(StatId::Hp, 80);
/// let mut acc = StatAccumulator::new();
///
/// acc.add(&helmet);
/// assert_eq!(acc.stats()[StatId::Hp], 80);
/// acc.remove(&helmet);
/// assert_eq!(acc, StatAccumulator::new());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatAccumulator {
    stats: StatVector,
    skill_bonus: SkillPoints,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a precomputed base (weapon, tomes, locked items).
    pub fn with_base(stats: StatVector, skill_bonus: SkillPoints) -> Self {
        Self { stats, skill_bonus }
    }

    /// Merges one item's static and rolled contributions.
    #[inline]
    pub fn add(&mut self, item: &Item) {
        self.stats += &item.static_stats;
        self.stats += &item.rolled_effective;
        self.skill_bonus += item.skill_points;
    }

    /// Exact inverse of [`add`](Self::add).
    #[inline]
    pub fn remove(&mut self, item: &Item) {
        self.stats -= &item.static_stats;
        self.stats -= &item.rolled_effective;
        self.skill_bonus = self.skill_bonus - item.skill_points;
    }

    pub fn stats(&self) -> &StatVector {
        &self.stats
    }

    /// Sum of the skill-point bonuses of every placed item.
    pub fn skill_bonus(&self) -> SkillPoints {
        self.skill_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge_core::{Attribute, ItemCategory, RollMode, StatId};

    fn items() -> Vec<Item> {
        let mut out = vec![
            Item::new("A", ItemCategory::Helmet)
                .with_stat(StatId::Hp, 1200)
                .with_stat(StatId::ManaRegen, -3)
                .with_skill_bonus(Attribute::Strength, 7),
            Item::new("B", ItemCategory::Boots)
                .with_rolled(StatId::SpellDamagePct, 5, 19)
                .with_skill_bonus(Attribute::Agility, -4),
            Item::new("C", ItemCategory::Ring)
                .with_stat(StatId::SpellDamageRaw, 55)
                .with_rolled(StatId::Hp, -100, -40),
        ];
        for item in &mut out {
            item.apply_roll_mode(RollMode::Average);
        }
        out
    }

    #[test]
    fn test_add_then_reverse_remove_restores_exactly() {
        let base = StatVector::from_pairs([(StatId::Hp, 535), (StatId::WalkSpeed, -12)]);
        let mut acc = StatAccumulator::with_base(base, SkillPoints::new([0, 3, 0, 0, 0]));
        let before = acc.clone();

        let items = items();
        for item in &items {
            acc.add(item);
        }
        assert_ne!(acc, before);
        for item in items.iter().rev() {
            acc.remove(item);
        }
        assert_eq!(acc, before);
    }

    #[test]
    fn test_interleaved_push_pop() {
        let items = items();
        let mut acc = StatAccumulator::new();
        acc.add(&items[0]);
        let after_first = acc.clone();
        acc.add(&items[1]);
        acc.remove(&items[1]);
        assert_eq!(acc, after_first);
        acc.add(&items[2]);
        acc.add(&items[2]);
        acc.remove(&items[2]);
        acc.remove(&items[2]);
        acc.remove(&items[0]);
        assert_eq!(acc, StatAccumulator::new());
    }

    #[test]
    fn test_skill_bonus_sum() {
        let items = items();
        let mut acc = StatAccumulator::new();
        for item in &items {
            acc.add(item);
        }
        assert_eq!(acc.skill_bonus().0, [7, 0, 0, 0, -4]);
        assert_eq!(acc.stats()[StatId::SpellDamagePct], 12);
        assert_eq!(acc.stats()[StatId::Hp], 1200 - 70);
    }
}
