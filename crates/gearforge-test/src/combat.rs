//! Weapon, spell and combo fixtures.

use gearforge_core::{AttackSpeed, ComboRow, Element, Item, ItemCategory, Spell, Weapon};

/// A level 100 water staff averaging 200 damage.
pub fn test_weapon() -> Weapon {
    Weapon::new(
        Item::new("Test Staff", ItemCategory::Weapon).with_level(100),
        AttackSpeed::Normal,
    )
    .with_damage(Element::Neutral, 40.0, 60.0)
    .with_damage(Element::Water, 130.0, 170.0)
}

/// A first-slot spell, fully converted to water.
pub fn bolt() -> Spell {
    Spell::new("Bolt", 1, 25.0).with_conversion([0.0, 0.0, 0.0, 100.0, 0.0, 0.0])
}

/// Three bolts, the last one boosted by `"Surge"`.
pub fn bolt_combo() -> Vec<ComboRow> {
    vec![
        ComboRow::new(bolt(), 2.0),
        ComboRow::new(bolt(), 1.0).with_boost("Surge"),
    ]
}

/// One heal and one bolt.
pub fn heal_combo() -> Vec<ComboRow> {
    vec![
        ComboRow::new(Spell::new("Mend", 2, 35.0).with_heal(25.0), 1.0),
        ComboRow::new(bolt(), 1.0),
    ]
}
