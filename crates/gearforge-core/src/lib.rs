//! GearForge Core - Core types for loadout optimization
//!
//! This crate provides the fundamental domain types for GearForge:
//! - Closed stat identifiers and dense stat tables
//! - Skill-point attributes
//! - Items, slots, item sets and weapons
//! - Combo rows, boost tokens and scoring targets
//! - User restrictions and threshold rows

pub mod combo;
pub mod error;
pub mod item;
pub mod restriction;
pub mod skill;
pub mod stat;
pub mod weapon;

pub use combo::{BoostRegistry, ComboRow, ScoringTarget, Spell, StatDeltas};
pub use error::{GearForgeError, Result, ValidationError};
pub use item::{
    Item, ItemCategory, ItemSet, RollMode, RolledStat, SetBonus, SetCatalog, Slot, NONE_ITEM_NAME,
};
pub use restriction::{
    base_skill_points, GuildTomeTier, Restrictions, SkillDirections, Threshold, ThresholdOp,
    ThresholdStat,
};
pub use skill::{
    skill_point_pct, Attribute, SkillPoints, EFFECTIVE_SKILL_POINT_CAP, MANUAL_SKILL_POINT_CAP,
};
pub use stat::{ScaledStats, StatId, StatVector};
pub use weapon::{AttackSpeed, DamageRange, Element, Weapon};
