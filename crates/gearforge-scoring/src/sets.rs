//! Equipped pieces and active set counting.

use smallvec::SmallVec;

use gearforge_core::{Item, ItemSet, SkillPoints, StatVector};

/// One equipped item together with its resolved set, if any.
#[derive(Debug, Clone, Copy)]
pub struct Piece<'a> {
    pub item: &'a Item,
    pub set: Option<&'a ItemSet>,
}

impl<'a> Piece<'a> {
    pub fn new(item: &'a Item, set: Option<&'a ItemSet>) -> Self {
        Self { item, set }
    }

    pub fn bare(item: &'a Item) -> Self {
        Self { item, set: None }
    }
}

/// Distinct equipped members per set.
///
/// Two copies of the same item count once.
#[derive(Debug, Clone, Default)]
pub struct SetCounts<'a> {
    entries: SmallVec<[(&'a ItemSet, SmallVec<[&'a str; 4]>); 4]>,
}

impl<'a> SetCounts<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every set member among `pieces`.
    pub fn from_pieces(pieces: &[Piece<'a>]) -> Self {
        let mut counts = Self::new();
        for piece in pieces {
            counts.push(piece);
        }
        counts
    }

    /// Records a piece; returns `(old_count, new_count)` for its set.
    pub fn push(&mut self, piece: &Piece<'a>) -> Option<(usize, usize)> {
        let set = piece.set?;
        let name = piece.item.name.as_str();
        let idx = match self.entries.iter().position(|(s, _)| s.name == set.name) {
            Some(i) => i,
            None => {
                self.entries.push((set, SmallVec::new()));
                self.entries.len() - 1
            }
        };
        let members = &mut self.entries[idx].1;
        let old = members.len();
        if !members.contains(&name) {
            members.push(name);
        }
        Some((old, members.len()))
    }

    pub fn count(&self, set_name: &str) -> usize {
        self.entries
            .iter()
            .find(|(s, _)| s.name == set_name)
            .map(|(_, m)| m.len())
            .unwrap_or(0)
    }

    /// `(set name, distinct count)` for every set with at least one member.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.entries.iter().map(|(s, m)| {
            let set: &'a ItemSet = *s;
            (set.name.as_str(), m.len())
        })
    }

    /// Skill points granted by all active set bonuses.
    pub fn skill_bonus(&self) -> SkillPoints {
        let mut total = SkillPoints::ZERO;
        for (set, members) in &self.entries {
            if let Some(bonus) = set.bonus_for(members.len()) {
                total += bonus.skill_points;
            }
        }
        total
    }

    /// Stats granted by all active set bonuses.
    pub fn stat_bonus(&self) -> StatVector {
        let mut total = StatVector::zero();
        for (set, members) in &self.entries {
            if let Some(bonus) = set.bonus_for(members.len()) {
                total += &bonus.stats;
            }
        }
        total
    }
}

/// Skill-point change when a set goes from `old` to `new` distinct members.
pub fn set_skill_delta(set: &ItemSet, old: usize, new: usize) -> SkillPoints {
    let before = set.bonus_for(old).map(|b| b.skill_points).unwrap_or_default();
    let after = set.bonus_for(new).map(|b| b.skill_points).unwrap_or_default();
    after - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge_core::{ItemCategory, SetBonus, StatId};

    fn set() -> ItemSet {
        ItemSet::new(
            "Pair",
            vec![
                SetBonus {
                    stats: StatVector::from_pairs([(StatId::Hp, 10)]),
                    ..SetBonus::default()
                },
                SetBonus {
                    stats: StatVector::from_pairs([(StatId::Hp, 50)]),
                    skill_points: SkillPoints::new([0, 0, 0, 8, 0]),
                    illegal: false,
                },
            ],
        )
    }

    #[test]
    fn test_duplicates_count_once() {
        let set = set();
        let a = Item::new("A", ItemCategory::Ring).with_set("Pair");
        let b = Item::new("B", ItemCategory::Ring).with_set("Pair");

        let mut counts = SetCounts::new();
        assert_eq!(counts.push(&Piece::new(&a, Some(&set))), Some((0, 1)));
        assert_eq!(counts.push(&Piece::new(&a, Some(&set))), Some((1, 1)));
        assert_eq!(counts.count("Pair"), 1);
        assert_eq!(counts.stat_bonus()[StatId::Hp], 10);
        assert!(counts.skill_bonus().is_zero());

        assert_eq!(counts.push(&Piece::new(&b, Some(&set))), Some((1, 2)));
        assert_eq!(counts.stat_bonus()[StatId::Hp], 50);
        assert_eq!(counts.skill_bonus().0, [0, 0, 0, 8, 0]);
    }

    #[test]
    fn test_pieces_without_set_are_ignored() {
        let plain = Item::new("Plain", ItemCategory::Boots);
        let mut counts = SetCounts::new();
        assert_eq!(counts.push(&Piece::bare(&plain)), None);
        assert_eq!(counts.iter().count(), 0);
    }

    #[test]
    fn test_set_skill_delta() {
        let set = set();
        assert_eq!(set_skill_delta(&set, 1, 2).0, [0, 0, 0, 8, 0]);
        assert_eq!(set_skill_delta(&set, 0, 1), SkillPoints::ZERO);
        assert_eq!(set_skill_delta(&set, 2, 2), SkillPoints::ZERO);
    }
}
