//! GearForge - A Gear Loadout Optimizer in Rust
//!
//! Pick a weapon, describe the combo you cast, hand over the item catalog and
//! get back the best five armor and accessory loadouts.
//!
//! # Example
//!
//! ```rust
//! use gearforge::prelude::*;
//!
//! let weapon = Weapon::new(Item::new("Staff", ItemCategory::Weapon), AttackSpeed::Normal)
//!     .with_damage(Element::Water, 90.0, 110.0);
//! let request = SearchRequest::new(weapon)
//!     .with_combo(vec![ComboRow::new(
//!         Spell::new("Bolt", 1, 25.0).with_conversion([0.0, 0.0, 0.0, 100.0, 0.0, 0.0]),
//!         1.0,
//!     )])
//!     .with_target(ScoringTarget::Stat(StatId::Hp))
//!     .with_items(vec![
//!         Item::new("Cap", ItemCategory::Helmet).with_stat(StatId::Hp, 120),
//!         Item::new("Vest", ItemCategory::Chestplate).with_stat(StatId::Hp, 300),
//!     ]);
//!
//! let search = GearSearch::new(SearchConfig::new().with_thread_count(ThreadCount::None));
//! let result = search.run(&request).unwrap();
//! assert_eq!(result.outcome, SearchOutcome::Found);
//! assert_eq!(result.best().unwrap().score, 420.0);
//! ```

// Domain types
pub use gearforge_core::{
    Attribute, AttackSpeed, BoostRegistry, ComboRow, DamageRange, Element, GearForgeError,
    GuildTomeTier, Item, ItemCategory, ItemSet, Restrictions, Result, RollMode, ScoringTarget,
    SetBonus, SetCatalog, SkillDirections, SkillPoints, Slot, Spell, StatId, StatVector,
    Threshold, ThresholdOp, ThresholdStat, ValidationError, Weapon,
};

// Scoring seams
pub use gearforge_scoring::{
    CombatFormulas, EquipOrderSolver, ScalingRule, SkillPointSolver, StandardFormulas,
};

// Configuration
pub use gearforge_config::{ConfigError, SearchConfig, TerminationConfig, ThreadCount};

// Search
pub use gearforge_solver::{
    CandidateResult, CountingSearchListener, GearSearch, LoggingSearchListener, SearchListener,
    SearchOutcome, SearchProgress, SearchRequest, SearchResult, SearchStatistics, TopK,
    WorkerStats, TOP_K,
};

pub mod prelude {
    pub use super::{
        Attribute, AttackSpeed, ComboRow, Element, Item, ItemCategory, ItemSet, Restrictions,
        ScoringTarget, Slot, Spell, StatId, Threshold, ThresholdStat, Weapon,
    };
    pub use super::{GearSearch, SearchConfig, SearchOutcome, SearchRequest, ThreadCount};
}
