//! Shared test fixtures for GearForge crates.
//!
//! This crate provides synthetic items, sets, weapons and combos for tests.
//! It depends only on `gearforge-core` so every other crate can use it as a
//! dev-dependency.
//!
//! - [`gear`] - armor and accessory fixtures, synthetic catalogs, item sets
//! - [`combat`] - weapons, spells and combo rows
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! gearforge-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use gearforge_test::gear::{hp_item, synthetic_catalog, twin_set};
//! use gearforge_test::combat::{test_weapon, bolt_combo};
//! ```

pub mod combat;
pub mod gear;

pub use combat::{bolt, bolt_combo, heal_combo, test_weapon};
pub use gear::{hp_item, synthetic_catalog, twin_rings, twin_set, TWIN_SET};
