//! Splitting the search space into disjoint contiguous ranges.

use serde::{Deserialize, Serialize};

use gearforge_core::Slot;

use crate::level::Dimension;

/// The loop a partition restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionTarget {
    /// One slot's pool. A free ring slot whose partner is locked uses
    /// `Slot(Ring1)` or `Slot(Ring2)` over the shared ring pool.
    Slot(Slot),
    /// The outer index `i` of the `(i, j)`, `i <= j` ring-pair loop.
    RingPair,
}

/// A contiguous `[start, end)` index range of one pool.
///
/// Assigned to one worker at a time and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub target: PartitionTarget,
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn new(target: PartitionTarget, start: usize, end: usize) -> Self {
        Self { target, start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits the dimension with the longest outer loop into at most `count`
/// non-empty contiguous partitions.
///
/// Ring-pair rows are balanced by pair count, since row `i` holds `n - i`
/// pairs. Returns an empty list when there is nothing to split.
pub fn plan_partitions(dimensions: &[Dimension], count: usize) -> Vec<Partition> {
    let Some(dim) = dimensions
        .iter()
        .filter(|d| d.outer_len() > 0)
        .max_by_key(|d| d.outer_len())
    else {
        return Vec::new();
    };
    let count = count.max(1);
    match dim.target {
        PartitionTarget::Slot(_) => split_even(dim, count),
        PartitionTarget::RingPair => split_ring_pairs(dim, count),
    }
}

fn split_even(dim: &Dimension, count: usize) -> Vec<Partition> {
    let len = dim.end - dim.start;
    let parts = count.min(len);
    let base = len / parts;
    let extra = len % parts;

    let mut out = Vec::with_capacity(parts);
    let mut start = dim.start;
    for k in 0..parts {
        let size = base + usize::from(k < extra);
        out.push(Partition::new(dim.target, start, start + size));
        start += size;
    }
    out
}

fn split_ring_pairs(dim: &Dimension, count: usize) -> Vec<Partition> {
    let n = dim.pool_len;
    let rows = dim.end - dim.start;
    let parts = count.min(rows);
    let total: u128 = (dim.start..dim.end).map(|i| (n - i) as u128).sum();

    let mut out = Vec::with_capacity(parts);
    let mut start = dim.start;
    let mut acc: u128 = 0;
    for i in dim.start..dim.end {
        acc += (n - i) as u128;
        let k = out.len() as u128 + 1;
        let rows_left = dim.end - (i + 1);
        let parts_left = parts - out.len() - 1;
        let reached = acc * parts as u128 >= total * k;
        if parts_left > 0 && (reached || rows_left == parts_left) {
            out.push(Partition::new(dim.target, start, i + 1));
            start = i + 1;
        }
    }
    out.push(Partition::new(dim.target, start, dim.end));
    out
}
