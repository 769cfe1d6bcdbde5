//! Skill-point attributes.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub};
use std::str::FromStr;

use crate::error::GearForgeError;

/// Most skill points a player may manually assign to one attribute.
pub const MANUAL_SKILL_POINT_CAP: i32 = 100;

/// Skill-point total past which an attribute gives no further effect.
pub const EFFECTIVE_SKILL_POINT_CAP: i32 = 150;

/// One of the five skill-point attributes, in game order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
    Defense,
    Agility,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Intelligence,
        Attribute::Defense,
        Attribute::Agility,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Three-letter short name (`str`, `dex`, `int`, `def`, `agi`).
    pub fn short_name(self) -> &'static str {
        match self {
            Attribute::Strength => "str",
            Attribute::Dexterity => "dex",
            Attribute::Intelligence => "int",
            Attribute::Defense => "def",
            Attribute::Agility => "agi",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.into_iter().find(|a| a.short_name() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Attribute {
    type Err = GearForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::from_short_name(s).ok_or_else(|| GearForgeError::UnknownStat(s.to_string()))
    }
}

/// Per-attribute skill-point values (requirements, bonuses or totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SkillPoints(pub [i32; 5]);

impl SkillPoints {
    pub const ZERO: SkillPoints = SkillPoints([0; 5]);

    pub const fn new(values: [i32; 5]) -> Self {
        Self(values)
    }

    /// Sum across all attributes.
    pub fn total(&self) -> i32 {
        self.0.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 5]
    }

    /// True if any attribute is negative.
    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|&v| v < 0)
    }

    /// Element-wise maximum.
    pub fn max(&self, other: &SkillPoints) -> SkillPoints {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a = (*a).max(*b);
        }
        out
    }

    /// Clamps every attribute below at zero.
    pub fn clamp_non_negative(&self) -> SkillPoints {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v = (*v).max(0);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::ALL.into_iter().map(move |a| (a, self.0[a.index()]))
    }
}

impl Index<Attribute> for SkillPoints {
    type Output = i32;

    fn index(&self, a: Attribute) -> &i32 {
        &self.0[a.index()]
    }
}

impl IndexMut<Attribute> for SkillPoints {
    fn index_mut(&mut self, a: Attribute) -> &mut i32 {
        &mut self.0[a.index()]
    }
}

impl Add for SkillPoints {
    type Output = SkillPoints;

    fn add(mut self, rhs: SkillPoints) -> SkillPoints {
        self += rhs;
        self
    }
}

impl AddAssign for SkillPoints {
    fn add_assign(&mut self, rhs: SkillPoints) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += *b;
        }
    }
}

impl Sub for SkillPoints {
    type Output = SkillPoints;

    fn sub(mut self, rhs: SkillPoints) -> SkillPoints {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= *b;
        }
        self
    }
}

/// Percentage effect of a skill-point total.
///
/// Follows a geometric falloff: each further point is worth 0.92% less than
/// the previous one, and totals past [`EFFECTIVE_SKILL_POINT_CAP`] add nothing.
pub fn skill_point_pct(points: i32) -> f64 {
    let sp = points.clamp(0, EFFECTIVE_SKILL_POINT_CAP);
    if sp == 0 {
        return 0.0;
    }
    const R: f64 = 0.9908;
    (1.0 - R.powi(sp + 1)) / (1.0 - R) - 1.0
}
