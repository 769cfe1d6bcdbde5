//! Incremental stat accumulation, feasibility filters and scoring.
//!
//! Everything evaluated per candidate lives here:
//! - [`StatAccumulator`]: push/pop of item contributions during search
//! - [`sp_lower_bound`] / [`SkillPointSolver`]: skill-point feasibility
//! - [`FastThresholdCheck`], [`EhpBound`], [`passes_thresholds`]: threshold rows
//! - [`ManaCheck`]: mana sustainability
//! - [`ScoringContext`]: stat assembly and objective evaluation
//! - [`GreedyAllocator`]: leftover skill-point spending

pub mod accumulator;
pub mod allocator;
pub mod context;
pub mod formula;
pub mod mana;
pub mod sets;
pub mod skillpoints;
pub mod threshold;

pub use accumulator::StatAccumulator;
pub use allocator::{Allocation, GreedyAllocator, STEP_SCHEDULE};
pub use context::{resolve_combo, ResolvedRow, ScalingRule, ScoringContext};
pub use formula::{total_health, CombatFormulas, SpellDamage, StandardFormulas};
pub use mana::{ManaBalance, ManaCheck, DEFAULT_MANA_TOLERANCE};
pub use sets::{set_skill_delta, Piece, SetCounts};
pub use skillpoints::{
    passes_prefilter, sp_lower_bound, EquipOrderSolver, SkillPointSolution, SkillPointSolver,
};
pub use threshold::{
    passes_thresholds, skill_floors, threshold_value, EhpBound, FastThresholdCheck,
};
