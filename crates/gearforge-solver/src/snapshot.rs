//! Search requests and the immutable per-run snapshot.
//!
//! A [`SearchRequest`] is everything a caller hands the search. Building a
//! [`SearchSnapshot`] validates it, ranks the pools and precomputes every
//! value that is constant across candidates. Workers share the snapshot
//! behind an `Arc` and never see the request again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gearforge_config::SearchConfig;
use gearforge_core::{
    BoostRegistry, ComboRow, GearForgeError, Item, ItemSet, Restrictions, Result, ScoringTarget,
    SetCatalog, SkillPoints, Slot, StatVector, ValidationError, Weapon,
};
use gearforge_scoring::{
    resolve_combo, skill_floors, EhpBound, FastThresholdCheck, ManaCheck, ScalingRule,
    ScoringContext,
};

use crate::level::Dimension;
use crate::partition::{Partition, PartitionTarget};
use crate::pool::ItemPools;

/// Character level used when a request does not name one.
pub const DEFAULT_CHARACTER_LEVEL: u32 = 106;

/// Inputs of one search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub weapon: Option<Weapon>,
    /// Character level; sets the skill-point budget.
    pub level: u32,
    pub tomes: Vec<Item>,
    /// Slots fixed by the user; they are not searched.
    pub locked: BTreeMap<Slot, Item>,
    /// Catalog the pools are built from.
    pub items: Vec<Item>,
    pub sets: SetCatalog,
    pub restrictions: Restrictions,
    pub combo: Vec<ComboRow>,
    pub boosts: BoostRegistry,
    /// Boost tokens applied to every evaluation.
    pub static_boosts: Vec<String>,
    /// Fixed raw bonuses from the ability tree.
    pub atree_raw: StatVector,
    pub elemental_boost_pct: f64,
    pub scaling: Vec<ScalingRule>,
    pub target: ScoringTarget,
    /// Seconds one pass of the combo takes; enables the mana check.
    pub combo_time: Option<f64>,
    pub allow_downtime: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            weapon: None,
            level: DEFAULT_CHARACTER_LEVEL,
            tomes: Vec::new(),
            locked: BTreeMap::new(),
            items: Vec::new(),
            sets: SetCatalog::new(),
            restrictions: Restrictions::default(),
            combo: Vec::new(),
            boosts: BoostRegistry::new(),
            static_boosts: Vec::new(),
            atree_raw: StatVector::zero(),
            elemental_boost_pct: 0.0,
            scaling: Vec::new(),
            target: ScoringTarget::default(),
            combo_time: None,
            allow_downtime: false,
        }
    }
}

impl SearchRequest {
    pub fn new(weapon: Weapon) -> Self {
        Self {
            weapon: Some(weapon),
            ..Self::default()
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn with_set(mut self, set: ItemSet) -> Self {
        self.sets.insert(set);
        self
    }

    pub fn with_combo(mut self, combo: Vec<ComboRow>) -> Self {
        self.combo = combo;
        self
    }

    pub fn with_boosts(mut self, boosts: BoostRegistry) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_target(mut self, target: ScoringTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_tome(mut self, tome: Item) -> Self {
        self.tomes.push(tome);
        self
    }

    pub fn with_locked(mut self, slot: Slot, item: Item) -> Self {
        self.locked.insert(slot, item);
        self
    }

    pub fn with_mana(mut self, combo_time: f64, allow_downtime: bool) -> Self {
        self.combo_time = Some(combo_time);
        self.allow_downtime = allow_downtime;
        self
    }

    pub fn with_elemental_boost(mut self, pct: f64) -> Self {
        self.elemental_boost_pct = pct;
        self
    }

    pub fn with_scaling_rule(mut self, rule: ScalingRule) -> Self {
        self.scaling.push(rule);
        self
    }

    pub fn with_static_boost(mut self, token: impl Into<String>) -> Self {
        self.static_boosts.push(token.into());
        self
    }
}

/// Per-run constants shared read-only by every worker.
#[derive(Debug)]
pub struct SearchSnapshot {
    pools: ItemPools,
    locked: [Option<Item>; 8],
    weapon: Item,
    sets: SetCatalog,
    restrictions: Restrictions,
    base_stats: StatVector,
    base_skill: SkillPoints,
    tome_bonus: SkillPoints,
    budget: i32,
    context: ScoringContext,
    mana: ManaCheck,
    fast_thresholds: FastThresholdCheck,
    ehp_bound: EhpBound,
    skill_floors: SkillPoints,
}

impl SearchSnapshot {
    /// Validates `request` and precomputes the search constants.
    ///
    /// # Errors
    ///
    /// [`ValidationError`]s for user-facing preconditions (no weapon, bad
    /// level range, unknown boost token, no damaging combo row) and
    /// [`GearForgeError::InvalidSnapshot`] for contexts the search cannot
    /// bound soundly.
    pub fn build(request: &SearchRequest, config: &SearchConfig) -> Result<Self> {
        let mut weapon = request.weapon.clone().ok_or(ValidationError::NoWeapon)?;
        request.restrictions.validate()?;

        let rows = resolve_combo(&request.combo, &request.boosts)?;
        let static_boosts = request.boosts.resolve(&request.static_boosts)?;

        weapon.item.apply_roll_mode(config.roll_mode);

        let mut context = ScoringContext::new(weapon.clone(), request.target)
            .with_atree_raw(request.atree_raw.clone())
            .with_elemental_boost(request.elemental_boost_pct)
            .with_static_boosts(static_boosts)
            .with_rows(rows);
        for rule in &request.scaling {
            context = context.with_scaling_rule(*rule);
        }
        if !context.has_damaging_rows() {
            return Err(ValidationError::NoDamagingComboRows.into());
        }
        context.validate()?;

        let mut locked: [Option<Item>; 8] = Default::default();
        for (&slot, item) in &request.locked {
            if item.category != slot.category() {
                return Err(GearForgeError::InvalidSnapshot(format!(
                    "locked {} item '{}' placed in {} slot",
                    item.category, item.name, slot
                )));
            }
            let mut item = item.clone();
            item.apply_roll_mode(config.roll_mode);
            item.illegal_at_two = item
                .set_name
                .as_deref()
                .is_some_and(|s| request.sets.is_illegal_at_two(s));
            locked[slot.index()] = Some(item);
        }

        let mut base_stats = StatVector::zero();
        let mut base_skill = SkillPoints::ZERO;
        let mut tome_bonus = SkillPoints::ZERO;
        for tome in &request.tomes {
            let mut tome = tome.clone();
            tome.apply_roll_mode(config.roll_mode);
            base_stats += &tome.static_stats;
            base_stats += &tome.rolled_effective;
            tome_bonus += tome.skill_points;
        }
        base_skill += tome_bonus;
        for item in locked.iter().flatten().chain(std::iter::once(&weapon.item)) {
            base_stats += &item.static_stats;
            base_stats += &item.rolled_effective;
            base_skill += item.skill_points;
        }

        let restrictions = request.restrictions.clone();
        let budget = restrictions.sp_budget(request.level);
        let pools = ItemPools::build(
            &request.items,
            &restrictions,
            &request.sets,
            config.roll_mode,
            request.target,
        );

        let mana = match request.combo_time {
            Some(time) => ManaCheck::new(time, request.allow_downtime)
                .with_tolerance(config.mana_tolerance),
            None => ManaCheck::disabled(),
        };
        let fast_thresholds =
            FastThresholdCheck::new(&restrictions.thresholds, &context, &request.sets);
        let ehp_bound = EhpBound::new(
            &restrictions.thresholds,
            &context,
            &request.sets,
            restrictions.skill_directions,
        );
        let skill_floors = skill_floors(&restrictions.thresholds);

        debug!(
            event = "snapshot_built",
            budget = budget,
            pooled = pools.total_len(),
            locked = locked.iter().flatten().count(),
            mana_check = mana.is_active(),
        );

        Ok(Self {
            pools,
            locked,
            weapon: weapon.item,
            sets: request.sets.clone(),
            restrictions,
            base_stats,
            base_skill,
            tome_bonus,
            budget,
            context,
            mana,
            fast_thresholds,
            ehp_bound,
            skill_floors,
        })
    }

    pub fn pools(&self) -> &ItemPools {
        &self.pools
    }

    pub fn locked(&self, slot: Slot) -> Option<&Item> {
        self.locked[slot.index()].as_ref()
    }

    pub fn is_free(&self, slot: Slot) -> bool {
        self.locked[slot.index()].is_none()
    }

    /// The weapon item with its roll mode applied.
    pub fn weapon(&self) -> &Item {
        &self.weapon
    }

    pub fn set(&self, name: &str) -> Option<&ItemSet> {
        self.sets.get(name)
    }

    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// Stats of the weapon, tomes and locked items.
    pub fn base_stats(&self) -> &StatVector {
        &self.base_stats
    }

    /// Skill-point bonuses of the weapon, tomes and locked items.
    pub fn base_skill(&self) -> SkillPoints {
        self.base_skill
    }

    pub fn tome_bonus(&self) -> SkillPoints {
        self.tome_bonus
    }

    pub fn budget(&self) -> i32 {
        self.budget
    }

    /// Totals the `≥` skill thresholds demand per attribute.
    pub fn skill_floors(&self) -> SkillPoints {
        self.skill_floors
    }

    pub fn context(&self) -> &ScoringContext {
        &self.context
    }

    pub fn mana(&self) -> &ManaCheck {
        &self.mana
    }

    pub fn fast_thresholds(&self) -> &FastThresholdCheck {
        &self.fast_thresholds
    }

    pub fn ehp_bound(&self) -> &EhpBound {
        &self.ehp_bound
    }

    /// Free loops of the search, the partitioned one first.
    ///
    /// Both rings free form one ring-pair dimension; a single free ring is a
    /// plain slot dimension over the ring pool.
    pub fn dimensions(&self, partition: Option<&Partition>) -> Vec<Dimension> {
        let mut dims = Vec::with_capacity(7);
        let ring_len = self.pools.ring().len();
        match (self.is_free(Slot::Ring1), self.is_free(Slot::Ring2)) {
            (true, true) => dims.push(Dimension::full(PartitionTarget::RingPair, ring_len)),
            (true, false) => {
                dims.push(Dimension::full(PartitionTarget::Slot(Slot::Ring1), ring_len))
            }
            (false, true) => {
                dims.push(Dimension::full(PartitionTarget::Slot(Slot::Ring2), ring_len))
            }
            (false, false) => {}
        }
        for slot in Slot::ALL {
            if !slot.is_ring() && self.is_free(slot) {
                dims.push(Dimension::full(
                    PartitionTarget::Slot(slot),
                    self.pools.slot(slot).len(),
                ));
            }
        }
        dims.sort_by_key(|d| match d.target {
            PartitionTarget::Slot(slot) => slot.index(),
            PartitionTarget::RingPair => Slot::Ring1.index(),
        });

        if let Some(partition) = partition {
            for dim in &mut dims {
                *dim = dim.apply(partition);
            }
            if let Some(pos) = dims.iter().position(|d| d.target == partition.target) {
                let dim = dims.remove(pos);
                dims.insert(0, dim);
            }
        }
        dims
    }

    /// Exact number of candidate combinations.
    pub fn candidate_count(&self) -> u128 {
        self.dimensions(None)
            .iter()
            .map(Dimension::candidate_count)
            .product()
    }
}
