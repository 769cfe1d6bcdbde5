//! Level-ordered enumeration of pool combinations.
//!
//! The *level* of a combination is the sum of the ranks chosen in every free
//! dimension. [`LevelEnumerator::run`] visits levels `0, 1, 2, …` in order and,
//! within one level, descends slot by slot with the remaining rank budget.
//! The last dimension takes exactly what is left, so every combination is
//! visited once, at its own level.

use gearforge_core::Slot;

use crate::partition::{Partition, PartitionTarget};

/// One free loop of the search: a slot pool or the ring-pair loop, restricted
/// to `[start, end)`.
///
/// Ranks are offsets from `start`. For the ring pair the rank of `(i, j)` is
/// `(i - start) + (j - start)` with `start <= i < end` and `i <= j < pool_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub target: PartitionTarget,
    pub start: usize,
    pub end: usize,
    pub pool_len: usize,
}

impl Dimension {
    /// The whole pool.
    pub fn full(target: PartitionTarget, pool_len: usize) -> Self {
        Self::restricted(target, pool_len, 0, pool_len)
    }

    pub fn restricted(target: PartitionTarget, pool_len: usize, start: usize, end: usize) -> Self {
        let end = end.min(pool_len);
        Self {
            target,
            start: start.min(end),
            end,
            pool_len,
        }
    }

    /// Restricts to `partition` when it targets this dimension.
    pub fn apply(self, partition: &Partition) -> Self {
        if partition.target == self.target {
            Self::restricted(self.target, self.pool_len, partition.start, partition.end)
        } else {
            self
        }
    }

    /// Iterations of the outermost loop over this dimension.
    pub fn outer_len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.outer_len() == 0
    }

    /// Largest rank offset.
    pub fn max_offset(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        match self.target {
            PartitionTarget::Slot(_) => self.end - 1 - self.start,
            PartitionTarget::RingPair => (self.end - 1 - self.start) + (self.pool_len - 1 - self.start),
        }
    }

    /// Absolute rank sum of offset zero.
    fn base_level(&self) -> usize {
        match self.target {
            PartitionTarget::Slot(_) => self.start,
            PartitionTarget::RingPair => 2 * self.start,
        }
    }

    /// Number of distinct choices.
    pub fn candidate_count(&self) -> u128 {
        match self.target {
            PartitionTarget::Slot(_) => self.outer_len() as u128,
            PartitionTarget::RingPair => (self.start..self.end)
                .map(|i| (self.pool_len - i) as u128)
                .sum(),
        }
    }
}

/// Callbacks driven by [`LevelEnumerator::run`].
///
/// `place` and `unplace` are always called in strict push/pop order.
pub trait LevelVisitor {
    /// Places pool entry `index` in `slot`. Returning `false` prunes the
    /// branch; nothing was placed and `unplace` is not called.
    fn place(&mut self, slot: Slot, index: usize) -> bool;

    fn unplace(&mut self, slot: Slot, index: usize);

    /// Every dimension holds a placement; `level` is the absolute rank sum.
    fn leaf(&mut self, level: usize);

    /// Polled before every placement and every leaf.
    fn should_stop(&mut self) -> bool;
}

/// Drives a [`LevelVisitor`] over a list of dimensions.
#[derive(Debug, Clone)]
pub struct LevelEnumerator {
    dims: Vec<Dimension>,
    /// `suffix_max[d]` is the largest offset sum of dimensions `d..`.
    suffix_max: Vec<usize>,
    base_level: usize,
}

impl LevelEnumerator {
    pub fn new(dims: Vec<Dimension>) -> Self {
        let mut suffix_max = vec![0; dims.len() + 1];
        for d in (0..dims.len()).rev() {
            suffix_max[d] = suffix_max[d + 1] + dims[d].max_offset();
        }
        let base_level = dims.iter().map(Dimension::base_level).sum();
        Self {
            dims,
            suffix_max,
            base_level,
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// Largest relative level.
    pub fn max_level(&self) -> usize {
        self.suffix_max[0]
    }

    /// Product of the dimensions' choice counts.
    pub fn candidate_count(&self) -> u128 {
        self.dims.iter().map(Dimension::candidate_count).product()
    }

    /// Visits every combination in non-decreasing level order.
    ///
    /// Returns `false` if the visitor stopped the run early.
    pub fn run<V: LevelVisitor>(&self, visitor: &mut V) -> bool {
        if self.dims.iter().any(Dimension::is_empty) {
            return true;
        }
        for level in 0..=self.max_level() {
            if !self.descend(0, level, self.base_level + level, visitor) {
                return false;
            }
        }
        true
    }

    /// Recurses into dimension `d` with `remaining` offset budget.
    fn descend<V: LevelVisitor>(
        &self,
        d: usize,
        remaining: usize,
        level: usize,
        visitor: &mut V,
    ) -> bool {
        if d == self.dims.len() {
            if visitor.should_stop() {
                return false;
            }
            visitor.leaf(level);
            return true;
        }

        let dim = &self.dims[d];
        let lo = remaining.saturating_sub(self.suffix_max[d + 1]);
        let hi = remaining.min(dim.max_offset());
        for offset in lo..=hi {
            let next = remaining - offset;
            let keep_going = match dim.target {
                PartitionTarget::Slot(slot) => self.visit(slot, dim.start + offset, visitor, |v| {
                    self.descend(d + 1, next, level, v)
                }),
                PartitionTarget::RingPair => self.visit_ring_pairs(dim, offset, visitor, |v| {
                    self.descend(d + 1, next, level, v)
                }),
            };
            if !keep_going {
                return false;
            }
        }
        true
    }

    fn visit<V, F>(&self, slot: Slot, index: usize, visitor: &mut V, inner: F) -> bool
    where
        V: LevelVisitor,
        F: FnOnce(&mut V) -> bool,
    {
        if visitor.should_stop() {
            return false;
        }
        if !visitor.place(slot, index) {
            return true;
        }
        let keep_going = inner(visitor);
        visitor.unplace(slot, index);
        keep_going
    }

    /// Every `(i, j)` ring pair at relative `offset`.
    fn visit_ring_pairs<V, F>(&self, dim: &Dimension, offset: usize, visitor: &mut V, mut inner: F) -> bool
    where
        V: LevelVisitor,
        F: FnMut(&mut V) -> bool,
    {
        let s = dim.start;
        let sum = offset + 2 * s;
        let i_lo = s.max((sum + 1).saturating_sub(dim.pool_len));
        let i_hi = (dim.end - 1).min(sum / 2);
        for i in i_lo..=i_hi {
            let j = sum - i;
            let keep_going = self.visit(Slot::Ring1, i, visitor, |v| {
                self.visit(Slot::Ring2, j, v, &mut inner)
            });
            if !keep_going {
                return false;
            }
        }
        true
    }
}
