//! Candidate pools per searchable category.
//!
//! Every pool starts with the NONE item at rank 0, followed by the catalog
//! items that pass the restrictions, sorted best-first by
//! [`item_heuristic`]. Ties go to the lower total requirement, then to the
//! name. The anytime quality of the level enumeration depends on this order;
//! completeness does not.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::debug;

use gearforge_core::{
    Attribute, Item, ItemCategory, Restrictions, RollMode, ScoringTarget, SetCatalog, Slot,
    StatId,
};

const DAMAGE_WEIGHTS: &[(StatId, f64)] = &[
    (StatId::SpellDamagePct, 1.0),
    (StatId::DamagePct, 1.0),
    (StatId::EarthDamagePct, 0.5),
    (StatId::ThunderDamagePct, 0.5),
    (StatId::WaterDamagePct, 0.5),
    (StatId::FireDamagePct, 0.5),
    (StatId::AirDamagePct, 0.5),
    (StatId::CritDamagePct, 0.5),
    (StatId::SpellDamageRaw, 0.1),
    (StatId::DamageRaw, 0.1),
];

const HEALING_WEIGHTS: &[(StatId, f64)] = &[
    (StatId::HealPct, 1.0),
    (StatId::Hp, 0.01),
    (StatId::HpBonus, 0.01),
];

const EHP_WEIGHTS: &[(StatId, f64)] = &[(StatId::Hp, 1.0), (StatId::HpBonus, 1.0)];

/// Best-first sort key of `item` for `target`; higher is better.
pub fn item_heuristic(item: &Item, target: ScoringTarget) -> f64 {
    let weighted = |weights: &[(StatId, f64)]| -> f64 {
        weights
            .iter()
            .map(|&(stat, w)| item.stat(stat) as f64 * w)
            .sum()
    };
    let sp = |attributes: &[Attribute], w: f64| -> f64 {
        attributes
            .iter()
            .map(|&a| item.skill_points[a] as f64 * w)
            .sum()
    };
    match target {
        ScoringTarget::ComboDamage => {
            weighted(DAMAGE_WEIGHTS) + sp(&[Attribute::Strength, Attribute::Dexterity], 0.5)
        }
        ScoringTarget::Healing => weighted(HEALING_WEIGHTS),
        ScoringTarget::Ehp => {
            weighted(EHP_WEIGHTS) + sp(&[Attribute::Defense, Attribute::Agility], 10.0)
        }
        ScoringTarget::Stat(stat) => item.stat(stat) as f64,
    }
}

/// True if `item` passes the level, major-ID and skill-direction filters.
pub fn item_allowed(item: &Item, restrictions: &Restrictions) -> bool {
    if !restrictions.level_allowed(item.level) {
        return false;
    }
    if restrictions.ban_major_ids && !item.major_ids.is_empty() {
        return false;
    }
    Attribute::ALL
        .iter()
        .all(|&a| restrictions.skill_directions.is_enabled(a) || !item.requires(a))
}

/// Ranked candidate pools; both ring slots share the ring pool.
#[derive(Debug, Clone, Default)]
pub struct ItemPools {
    /// Indexed like [`ItemCategory::SEARCHABLE`].
    pools: Vec<Vec<Item>>,
}

impl ItemPools {
    /// Filters, collapses rolls, tags illegal sets and ranks `catalog`.
    ///
    /// Items of non-searchable categories are ignored. Empty pools are legal
    /// and hold only NONE.
    pub fn build(
        catalog: &[Item],
        restrictions: &Restrictions,
        sets: &SetCatalog,
        roll_mode: RollMode,
        target: ScoringTarget,
    ) -> Self {
        let pools: Vec<Vec<Item>> = ItemCategory::SEARCHABLE
            .as_slice()
            .par_iter()
            .map(|&category| build_pool(catalog, category, restrictions, sets, roll_mode, target))
            .collect();

        for (category, pool) in ItemCategory::SEARCHABLE.iter().zip(&pools) {
            debug!(
                event = "pool_built",
                category = %category,
                candidates = pool.len(),
            );
        }
        Self { pools }
    }

    /// Pool of a searchable category; empty for weapons and tomes.
    pub fn category(&self, category: ItemCategory) -> &[Item] {
        ItemCategory::SEARCHABLE
            .iter()
            .position(|&c| c == category)
            .and_then(|i| self.pools.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn slot(&self, slot: Slot) -> &[Item] {
        self.category(slot.category())
    }

    pub fn ring(&self) -> &[Item] {
        self.category(ItemCategory::Ring)
    }

    /// Total entries across pools, NONE items included.
    pub fn total_len(&self) -> usize {
        self.pools.iter().map(Vec::len).sum()
    }
}

fn build_pool(
    catalog: &[Item],
    category: ItemCategory,
    restrictions: &Restrictions,
    sets: &SetCatalog,
    roll_mode: RollMode,
    target: ScoringTarget,
) -> Vec<Item> {
    let mut ranked: Vec<(f64, Item)> = catalog
        .iter()
        .filter(|item| item.category == category && !item.is_none())
        .filter(|item| item_allowed(item, restrictions))
        .map(|item| {
            let mut item = item.clone();
            item.apply_roll_mode(roll_mode);
            item.illegal_at_two = item
                .set_name
                .as_deref()
                .is_some_and(|s| sets.is_illegal_at_two(s));
            (item_heuristic(&item, target), item)
        })
        .collect();

    ranked.sort_by(|(sa, a), (sb, b)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.requirements.total().cmp(&b.requirements.total()))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut pool = Vec::with_capacity(ranked.len() + 1);
    pool.push(Item::none(category));
    pool.extend(ranked.into_iter().map(|(_, item)| item));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge_core::SkillDirections;
    use gearforge_test::{hp_item, twin_rings, twin_set};

    fn build(catalog: &[Item], restrictions: &Restrictions, target: ScoringTarget) -> ItemPools {
        let sets = SetCatalog::new().with_set(twin_set());
        ItemPools::build(catalog, restrictions, &sets, RollMode::Max, target)
    }

    fn names(pool: &[Item]) -> Vec<&str> {
        pool.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_none_first_then_best_first() {
        let catalog = vec![
            hp_item("Small", ItemCategory::Helmet, 100),
            hp_item("Large", ItemCategory::Helmet, 900),
            hp_item("Medium", ItemCategory::Helmet, 400),
            hp_item("Boot", ItemCategory::Boots, 50),
        ];
        let pools = build(&catalog, &Restrictions::default(), ScoringTarget::Stat(StatId::Hp));
        assert_eq!(
            names(pools.slot(Slot::Helmet)),
            vec!["NONE", "Large", "Medium", "Small"]
        );
        assert_eq!(names(pools.slot(Slot::Boots)), vec!["NONE", "Boot"]);
        assert_eq!(names(pools.slot(Slot::Necklace)), vec!["NONE"]);
    }

    #[test]
    fn test_ties_break_on_requirement_then_name() {
        let catalog = vec![
            hp_item("B", ItemCategory::Bracelet, 10).with_requirement(Attribute::Strength, 30),
            hp_item("C", ItemCategory::Bracelet, 10),
            hp_item("A", ItemCategory::Bracelet, 10).with_requirement(Attribute::Strength, 30),
        ];
        let pools = build(&catalog, &Restrictions::default(), ScoringTarget::Stat(StatId::Hp));
        assert_eq!(names(pools.slot(Slot::Bracelet)), vec!["NONE", "C", "A", "B"]);
    }

    #[test]
    fn test_filters() {
        let catalog = vec![
            hp_item("Low", ItemCategory::Helmet, 1).with_level(10),
            hp_item("High", ItemCategory::Helmet, 1).with_level(100),
            hp_item("Major", ItemCategory::Helmet, 1)
                .with_level(50)
                .with_major_id("Overflow"),
            hp_item("Agile", ItemCategory::Helmet, 1)
                .with_level(50)
                .with_requirement(Attribute::Agility, 20),
            hp_item("Bonus", ItemCategory::Helmet, 1)
                .with_level(50)
                .with_skill_bonus(Attribute::Agility, 5),
        ];
        let restrictions = Restrictions::default()
            .with_level_range(20, 90)
            .banning_major_ids()
            .with_skill_directions(SkillDirections::ALL_ENABLED.disable(Attribute::Agility));
        let pools = build(&catalog, &restrictions, ScoringTarget::Stat(StatId::Hp));
        assert_eq!(names(pools.slot(Slot::Helmet)), vec!["NONE", "Bonus"]);
    }

    #[test]
    fn test_rings_share_pool_and_are_tagged() {
        let (a, b) = twin_rings();
        let pools = build(&[a, b], &Restrictions::default(), ScoringTarget::ComboDamage);
        assert_eq!(pools.slot(Slot::Ring1), pools.slot(Slot::Ring2));
        let ring = pools.ring();
        assert_eq!(names(ring), vec!["NONE", "Twin Ring A", "Twin Ring B"]);
        assert!(!ring[0].illegal_at_two);
        assert!(ring[1].illegal_at_two && ring[2].illegal_at_two);
    }

    #[test]
    fn test_roll_mode_is_applied() {
        let item = Item::new("Rolled", ItemCategory::Necklace).with_rolled(StatId::Hp, 10, 30);
        let sets = SetCatalog::new();
        let pools = ItemPools::build(
            &[item],
            &Restrictions::default(),
            &sets,
            RollMode::Min,
            ScoringTarget::Ehp,
        );
        assert_eq!(pools.slot(Slot::Necklace)[1].stat(StatId::Hp), 10);
    }

    #[test]
    fn test_weapons_are_not_pooled() {
        let catalog = vec![Item::new("Staff", ItemCategory::Weapon)];
        let pools = build(&catalog, &Restrictions::default(), ScoringTarget::ComboDamage);
        assert_eq!(pools.total_len(), 7);
        assert!(pools.category(ItemCategory::Weapon).is_empty());
    }
}
