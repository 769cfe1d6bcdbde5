//! Armor and accessory fixtures.
//!
//! # Example
//!
//! ```
//! use gearforge_core::ItemCategory;
//! use gearforge_test::gear::synthetic_catalog;
//!
//! let items = synthetic_catalog(3, 11);
//! assert_eq!(items.len(), 3 * 7);
//! assert!(items.iter().all(|i| i.category != ItemCategory::Weapon));
//! ```

use gearforge_core::{Attribute, Item, ItemCategory, ItemSet, SetBonus, SkillPoints, StatId, StatVector};

/// Name of the set returned by [`twin_set`].
pub const TWIN_SET: &str = "Twin Rings";

/// An item carrying only flat health.
pub fn hp_item(name: &str, category: ItemCategory, hp: i64) -> Item {
    Item::new(name, category).with_stat(StatId::Hp, hp)
}

/// A two-piece ring set whose 2-piece bonus is illegal.
pub fn twin_set() -> ItemSet {
    ItemSet::new(
        TWIN_SET,
        vec![
            SetBonus {
                stats: StatVector::from_pairs([(StatId::SpellDamagePct, 5)]),
                ..SetBonus::default()
            },
            SetBonus {
                stats: StatVector::from_pairs([(StatId::SpellDamagePct, 40)]),
                skill_points: SkillPoints::new([10, 0, 0, 0, 0]),
                illegal: true,
            },
        ],
    )
}

/// The two distinct members of [`twin_set`].
pub fn twin_rings() -> (Item, Item) {
    let a = Item::new("Twin Ring A", ItemCategory::Ring)
        .with_level(80)
        .with_stat(StatId::SpellDamagePct, 12)
        .with_set(TWIN_SET);
    let b = Item::new("Twin Ring B", ItemCategory::Ring)
        .with_level(80)
        .with_stat(StatId::SpellDamagePct, 11)
        .with_set(TWIN_SET);
    (a, b)
}

/// Deterministic pseudo-random generator so fixtures are stable.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound.max(1)
    }
}

/// `per_category` items for every searchable category.
///
/// Items get levels between 1 and 106, a few flat stats, rolled spell damage
/// and occasional skill-point requirements and bonuses.
pub fn synthetic_catalog(per_category: usize, seed: u64) -> Vec<Item> {
    let mut rng = Lcg(seed);
    let mut items = Vec::with_capacity(per_category * ItemCategory::SEARCHABLE.len());
    for category in ItemCategory::SEARCHABLE {
        for i in 0..per_category {
            let mut item = Item::new(format!("{category} {i}"), category)
                .with_level(1 + rng.next(106) as u32)
                .with_stat(StatId::Hp, 50 + rng.next(900) as i64)
                .with_stat(StatId::ManaRegen, rng.next(9) as i64 - 3)
                .with_rolled(StatId::SpellDamagePct, rng.next(6) as i64, 6 + rng.next(12) as i64);
            for a in Attribute::ALL {
                if rng.next(4) == 0 {
                    item.requirements[a] = 10 + rng.next(60) as i32;
                }
                if rng.next(6) == 0 {
                    item.skill_points[a] = rng.next(15) as i32 - 4;
                }
            }
            if rng.next(9) == 0 {
                item = item.with_major_id("Overflow");
            }
            items.push(item);
        }
    }
    items
}
