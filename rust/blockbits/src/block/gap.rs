//! Run-length ("GAP") storage for one block.

use std::ops::Range;

use blockbits_common::Result;
use blockbits_ranges::set_ops;
use itertools::Itertools;

use super::{BLOCK_BITS, bits::BitBlock};
use crate::combine::CombineOp;

/// A run of ones `[first, last]` (both inclusive, block-relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub first: u16,
    pub last: u16,
}

impl Run {
    #[inline]
    pub fn point(value: u16) -> Run {
        Run {
            first: value,
            last: value,
        }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.last as u32 - self.first as u32 + 1
    }

    #[inline]
    pub fn as_range(&self) -> Range<u32> {
        self.first as u32..self.last as u32 + 1
    }

    #[inline]
    pub fn contains(&self, offset: u16) -> bool {
        offset >= self.first && offset <= self.last
    }

    /// Merges `next` into `self` when they overlap or touch.
    #[inline]
    pub fn coalesce(self, next: Run) -> std::result::Result<Run, (Run, Run)> {
        if self.first <= next.first && next.first as u32 <= self.last as u32 + 1 {
            Ok(Run {
                first: self.first,
                last: self.last.max(next.last),
            })
        } else {
            Err((self, next))
        }
    }
}

impl From<Range<u32>> for Run {
    #[inline]
    fn from(r: Range<u32>) -> Self {
        debug_assert!(r.start < r.end && r.end <= BLOCK_BITS);
        Run {
            first: r.start as u16,
            last: (r.end - 1) as u16,
        }
    }
}

/// A sparse or clustered block kept as ascending, disjoint, non-adjacent
/// runs of ones. The run boundaries are the block's transition points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapBlock {
    runs: Vec<Run>,
}

impl GapBlock {
    /// Run count at which GAP storage (4 bytes per run) reaches the size
    /// of a raw bit block. Blocks never hold more runs than this.
    pub const MAX_RUNS: usize = BLOCK_BITS as usize / 8 / 4;

    pub fn empty() -> GapBlock {
        GapBlock { runs: Vec::new() }
    }

    pub fn full() -> Result<GapBlock> {
        GapBlock::from_ranges(std::iter::once(0..BLOCK_BITS))
    }

    /// Builds a block from ascending ranges; overlapping or adjacent
    /// ranges are merged.
    pub fn from_ranges(ranges: impl Iterator<Item = Range<u32>>) -> Result<GapBlock> {
        let capacity = ranges.size_hint().0;
        Self::collect_runs(ranges, capacity)
    }

    /// Like [`GapBlock::from_ranges`], reserving room for `capacity` runs
    /// up front.
    fn collect_runs(
        ranges: impl Iterator<Item = Range<u32>>,
        capacity: usize,
    ) -> Result<GapBlock> {
        let mut runs = Vec::new();
        runs.try_reserve_exact(capacity)?;
        for run in ranges
            .filter(|r| r.start < r.end)
            .map(Run::from)
            .coalesce(Run::coalesce)
        {
            runs.try_reserve(1)?;
            runs.push(run);
        }
        Ok(GapBlock { runs })
    }

    /// Takes runs as they are; see [`GapBlock::check_invariants`].
    pub(crate) fn from_runs(runs: Vec<Run>) -> GapBlock {
        GapBlock { runs }
    }

    pub fn from_bits(bits: &BitBlock) -> Result<GapBlock> {
        let mut runs = Vec::new();
        runs.try_reserve_exact(bits.count_runs())?;
        runs.extend(bits.runs().map(Run::from));
        Ok(GapBlock { runs })
    }

    pub fn try_clone(&self) -> Result<GapBlock> {
        let mut runs = Vec::new();
        runs.try_reserve_exact(self.runs.len())?;
        runs.extend_from_slice(&self.runs);
        Ok(GapBlock { runs })
    }

    pub fn to_bits(&self) -> Result<BitBlock> {
        BitBlock::from_ranges(self.ranges())
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<u32>> + Clone + '_ {
        self.runs.iter().map(Run::as_range)
    }

    /// Ascending offsets where the bit value changes. The value before the
    /// first transition is 0. An end transition at `BLOCK_BITS` is included
    /// for a run that reaches the end of the block.
    pub fn transitions(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges().flat_map(|r| [r.start, r.end])
    }

    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.runs.len() == 1 && self.runs[0].len() == BLOCK_BITS
    }

    pub fn count_ones(&self) -> u32 {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn count_range(&self, range: Range<u32>) -> u32 {
        let start_idx = self.runs.partition_point(|r| (r.last as u32) < range.start);
        self.runs[start_idx..]
            .iter()
            .map(Run::as_range)
            .take_while(|r| r.start < range.end)
            .map(|r| r.end.min(range.end) - r.start.max(range.start))
            .sum()
    }

    /// Index of the first run that ends at or after `offset`.
    #[inline]
    fn lower_bound(&self, offset: u32) -> usize {
        self.runs.partition_point(|r| (r.last as u32) < offset)
    }

    pub fn contains(&self, offset: u16) -> bool {
        self.runs
            .get(self.lower_bound(offset as u32))
            .is_some_and(|r| r.first <= offset)
    }

    /// First set bit at or after `from`.
    pub fn find_next(&self, from: u32) -> Option<u16> {
        self.runs
            .get(self.lower_bound(from))
            .map(|r| (r.first as u32).max(from) as u16)
    }

    /// Sets the bit to `value`, returns whether it changed. May add one run.
    /// On allocation failure the block is left unchanged.
    pub fn set_value(&mut self, offset: u16, value: bool) -> Result<bool> {
        let idx = self.lower_bound(offset as u32);
        let covered = self.runs.get(idx).is_some_and(|r| r.first <= offset);
        if covered == value {
            return Ok(false);
        }
        self.runs.try_reserve(1)?;

        if value {
            let joins_prev = idx > 0 && self.runs[idx - 1].last as u32 + 1 == offset as u32;
            let joins_next = idx < self.runs.len() && offset as u32 + 1 == self.runs[idx].first as u32;
            match (joins_prev, joins_next) {
                (true, true) => {
                    self.runs[idx - 1].last = self.runs[idx].last;
                    self.runs.remove(idx);
                }
                (true, false) => self.runs[idx - 1].last = offset,
                (false, true) => self.runs[idx].first = offset,
                (false, false) => self.runs.insert(idx, Run::point(offset)),
            }
        } else {
            let run = self.runs[idx];
            if run.first == run.last {
                self.runs.remove(idx);
            } else if offset == run.first {
                self.runs[idx].first += 1;
            } else if offset == run.last {
                self.runs[idx].last -= 1;
            } else {
                self.runs[idx].last = offset - 1;
                self.runs.insert(
                    idx + 1,
                    Run {
                        first: offset + 1,
                        last: run.last,
                    },
                );
            }
        }
        Ok(true)
    }

    /// Returns a copy with every bit of `range` set to `value`.
    pub fn with_range(&self, range: Range<u32>, value: bool) -> Result<GapBlock> {
        let single = std::iter::once(range);
        let capacity = self.runs.len() + 1;
        if value {
            Self::collect_runs(set_ops::union_ranges(self.ranges(), single), capacity)
        } else {
            Self::collect_runs(set_ops::difference_ranges(self.ranges(), single), capacity)
        }
    }

    pub fn complement(&self) -> Result<GapBlock> {
        Self::collect_runs(
            set_ops::complement_ranges(BLOCK_BITS, self.ranges()),
            self.runs.len() + 1,
        )
    }

    /// Combines two run lists without materializing bits.
    pub fn combine(&self, other: &GapBlock, op: CombineOp) -> Result<GapBlock> {
        let (a, b) = (self.ranges(), other.ranges());
        let capacity = self.runs.len() + other.runs.len() + 1;
        match op {
            CombineOp::And => Self::collect_runs(set_ops::intersect_ranges(a, b), capacity),
            CombineOp::Or => Self::collect_runs(set_ops::union_ranges(a, b), capacity),
            CombineOp::Sub => Self::collect_runs(set_ops::difference_ranges(a, b), capacity),
            CombineOp::Xor => {
                Self::collect_runs(set_ops::symmetric_difference_ranges(a, b), capacity)
            }
        }
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    pub fn compact(&mut self) {
        self.runs.shrink_to_fit();
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.runs.capacity() * std::mem::size_of::<Run>()
    }

    /// Runs must be non-empty, ascending, disjoint and separated by at
    /// least one zero bit.
    pub fn check_invariants(&self) -> Result<()> {
        for run in &self.runs {
            blockbits_common::verify_data!(run, run.first <= run.last);
        }
        for pair in self.runs.windows(2) {
            blockbits_common::verify_data!(
                runs,
                (pair[0].last as u32) + 1 < pair[1].first as u32
            );
        }
        Ok(())
    }
}
