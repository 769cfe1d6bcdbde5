//! User restrictions on a search.

use std::fmt;
use std::str::FromStr;

use crate::error::{GearForgeError, ValidationError};
use crate::skill::Attribute;
use crate::stat::StatId;

/// Skill points granted by character level alone.
pub const MAX_BASE_SKILL_POINTS: i32 = 200;

/// Guild tome tier adding skill points on top of the level budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GuildTomeTier {
    #[default]
    None,
    /// Budget 204 at max level.
    Minor,
    /// Budget 205 at max level.
    Major,
}

impl GuildTomeTier {
    pub fn extra_skill_points(self) -> i32 {
        match self {
            GuildTomeTier::None => 0,
            GuildTomeTier::Minor => 4,
            GuildTomeTier::Major => 5,
        }
    }
}

/// Skill points available from character level.
pub fn base_skill_points(level: u32) -> i32 {
    let earned = (level.saturating_sub(1) as i64) * 2;
    earned.min(MAX_BASE_SKILL_POINTS as i64) as i32
}

/// Comparison of a threshold row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdOp {
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    AtLeast,
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    AtMost,
}

impl ThresholdOp {
    pub fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            ThresholdOp::AtLeast => value >= bound,
            ThresholdOp::AtMost => value <= bound,
        }
    }
}

/// The quantity a threshold row constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdStat {
    /// An additive stat of the final snapshot.
    Stat(StatId),
    /// Final skill-point total of an attribute.
    Skill(Attribute),
    /// Derived effective health.
    Ehp,
}

impl fmt::Display for ThresholdStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdStat::Stat(id) => write!(f, "{id}"),
            ThresholdStat::Skill(a) => write!(f, "{a}"),
            ThresholdStat::Ehp => f.write_str("ehp"),
        }
    }
}

impl FromStr for ThresholdStat {
    type Err = GearForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ehp" {
            return Ok(ThresholdStat::Ehp);
        }
        if let Some(a) = Attribute::from_short_name(s) {
            return Ok(ThresholdStat::Skill(a));
        }
        s.parse().map(ThresholdStat::Stat)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ThresholdStat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ThresholdStat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A `(stat, operator, value)` constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Threshold {
    pub stat: ThresholdStat,
    pub op: ThresholdOp,
    pub value: f64,
}

impl Threshold {
    pub fn at_least(stat: ThresholdStat, value: f64) -> Self {
        Self {
            stat,
            op: ThresholdOp::AtLeast,
            value,
        }
    }

    pub fn at_most(stat: ThresholdStat, value: f64) -> Self {
        Self {
            stat,
            op: ThresholdOp::AtMost,
            value,
        }
    }
}

/// Which attributes may receive skill points; disabled attributes exclude
/// items requiring them and receive no manual points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SkillDirections(pub [bool; 5]);

impl SkillDirections {
    pub const ALL_ENABLED: SkillDirections = SkillDirections([true; 5]);

    pub fn is_enabled(&self, attribute: Attribute) -> bool {
        self.0[attribute.index()]
    }

    pub fn disable(mut self, attribute: Attribute) -> Self {
        self.0[attribute.index()] = false;
        self
    }
}

impl Default for SkillDirections {
    fn default() -> Self {
        Self::ALL_ENABLED
    }
}

/// Everything the user constrains before a search starts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Restrictions {
    pub min_level: u32,
    pub max_level: u32,
    pub skill_directions: SkillDirections,
    pub ban_major_ids: bool,
    pub guild_tome: GuildTomeTier,
    pub thresholds: Vec<Threshold>,
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 106,
            skill_directions: SkillDirections::ALL_ENABLED,
            ban_major_ids: false,
            guild_tome: GuildTomeTier::None,
            thresholds: Vec::new(),
        }
    }
}

impl Restrictions {
    pub fn with_level_range(mut self, min: u32, max: u32) -> Self {
        self.min_level = min;
        self.max_level = max;
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    pub fn with_skill_directions(mut self, directions: SkillDirections) -> Self {
        self.skill_directions = directions;
        self
    }

    pub fn banning_major_ids(mut self) -> Self {
        self.ban_major_ids = true;
        self
    }

    pub fn with_guild_tome(mut self, tier: GuildTomeTier) -> Self {
        self.guild_tome = tier;
        self
    }

    pub fn level_allowed(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }

    /// Total skill points a build at `character_level` may require.
    pub fn sp_budget(&self, character_level: u32) -> i32 {
        base_skill_points(character_level) + self.guild_tome.extra_skill_points()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_level > self.max_level {
            return Err(ValidationError::InvalidLevelRange {
                min: self.min_level,
                max: self.max_level,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_tiers() {
        let r = Restrictions::default();
        assert_eq!(r.sp_budget(106), 200);
        assert_eq!(r.sp_budget(1), 0);
        assert_eq!(r.sp_budget(50), 98);
        assert_eq!(r.clone().with_guild_tome(GuildTomeTier::Minor).sp_budget(106), 204);
        assert_eq!(r.with_guild_tome(GuildTomeTier::Major).sp_budget(106), 205);
    }

    #[test]
    fn test_threshold_stat_parsing() {
        assert_eq!("ehp".parse::<ThresholdStat>().unwrap(), ThresholdStat::Ehp);
        assert_eq!(
            "str".parse::<ThresholdStat>().unwrap(),
            ThresholdStat::Skill(Attribute::Strength)
        );
        assert_eq!(
            "mr".parse::<ThresholdStat>().unwrap(),
            ThresholdStat::Stat(StatId::ManaRegen)
        );
        assert!("wat".parse::<ThresholdStat>().is_err());
    }

    #[test]
    fn test_threshold_ops() {
        assert!(ThresholdOp::AtLeast.holds(5.0, 5.0));
        assert!(!ThresholdOp::AtLeast.holds(4.9, 5.0));
        assert!(ThresholdOp::AtMost.holds(5.0, 5.0));
        assert!(!ThresholdOp::AtMost.holds(5.1, 5.0));
    }

    #[test]
    fn test_level_range_validation() {
        let r = Restrictions::default().with_level_range(90, 80);
        assert_eq!(
            r.validate(),
            Err(ValidationError::InvalidLevelRange { min: 90, max: 80 })
        );
        let r = Restrictions::default().with_level_range(80, 90);
        assert!(r.validate().is_ok());
        assert!(r.level_allowed(85));
        assert!(!r.level_allowed(91));
    }

    #[test]
    fn test_skill_directions() {
        let d = SkillDirections::ALL_ENABLED.disable(Attribute::Agility);
        assert!(!d.is_enabled(Attribute::Agility));
        assert!(d.is_enabled(Attribute::Strength));
    }
}
