//! Fixed-span blocks: the unit of storage, representation choice and
//! combination.

use std::ops::Range;

use blockbits_common::Result;
use blockbits_ranges::set_ops;

use crate::{combine::CombineOp, config::Strategy, optimize::OptimizeMode};

pub mod bits;
pub mod gap;

pub use bits::BitBlock;
pub use gap::{GapBlock, Run};

/// Number of bits covered by one block.
pub const BLOCK_BITS: u32 = 1 << 16;

/// Number of `u64` words in a raw bit block.
pub const BLOCK_WORDS: usize = BLOCK_BITS as usize / 64;

/// Size of a raw bit block in bytes.
pub const BLOCK_BYTES: usize = BLOCK_BITS as usize / 8;

/// Run count at or below which the optimizer turns a bit block into a GAP
/// block in the default modes.
pub const AUTO_GAP_RUNS: usize = BLOCK_BITS as usize / (64 * 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Bits,
    Gap,
    Full,
}

/// A materialized block. An absent block (not stored in the directory)
/// reads as all zeros.
#[derive(Debug, Clone)]
pub enum Block {
    Bits(BitBlock),
    Gap(GapBlock),
    /// All ones, without storage.
    Full,
}

impl Block {
    /// A zero block in the representation chosen by `strategy`.
    pub fn empty(strategy: Strategy) -> Result<Block> {
        Ok(match strategy {
            Strategy::Bit => Block::Bits(BitBlock::empty()?),
            Strategy::Gap => Block::Gap(GapBlock::empty()),
        })
    }

    /// Wraps a GAP block, falling back to bits when it has too many runs.
    pub fn from_gap(gap: GapBlock) -> Result<Block> {
        if gap.run_count() > GapBlock::MAX_RUNS {
            log::trace!("gap block with {} runs materialized as bits", gap.run_count());
            Ok(Block::Bits(gap.to_bits()?))
        } else {
            Ok(Block::Gap(gap))
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Bits(_) => BlockKind::Bits,
            Block::Gap(_) => BlockKind::Gap,
            Block::Full => BlockKind::Full,
        }
    }

    pub fn try_clone(&self) -> Result<Block> {
        Ok(match self {
            Block::Bits(bits) => Block::Bits(bits.try_clone()?),
            Block::Gap(gap) => Block::Gap(gap.try_clone()?),
            Block::Full => Block::Full,
        })
    }

    #[inline]
    pub fn contains(&self, offset: u16) -> bool {
        match self {
            Block::Bits(bits) => bits.contains(offset),
            Block::Gap(gap) => gap.contains(offset),
            Block::Full => true,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Block::Bits(bits) => bits.count_ones(),
            Block::Gap(gap) => gap.count_ones(),
            Block::Full => BLOCK_BITS,
        }
    }

    pub fn count_range(&self, range: Range<u32>) -> u32 {
        match self {
            Block::Bits(bits) => bits.count_range(range),
            Block::Gap(gap) => gap.count_range(range),
            Block::Full => range.end.saturating_sub(range.start),
        }
    }

    /// First set bit at or after `from`.
    pub fn find_next(&self, from: u32) -> Option<u16> {
        match self {
            Block::Bits(bits) => bits.find_next(from),
            Block::Gap(gap) => gap.find_next(from),
            Block::Full => (from < BLOCK_BITS).then_some(from as u16),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Block::Bits(bits) => bits.is_all_zero(),
            Block::Gap(gap) => gap.is_empty(),
            Block::Full => false,
        }
    }

    pub fn is_full(&self) -> bool {
        match self {
            Block::Bits(bits) => bits.is_all_ones(),
            Block::Gap(gap) => gap.is_full(),
            Block::Full => true,
        }
    }

    pub fn run_count(&self) -> usize {
        match self {
            Block::Bits(bits) => bits.count_runs(),
            Block::Gap(gap) => gap.run_count(),
            Block::Full => 1,
        }
    }

    /// Sets the bit to `value`, returns whether it changed.
    pub fn set_value(&mut self, offset: u16, value: bool) -> Result<bool> {
        match self {
            Block::Bits(bits) => Ok(bits.set_value(offset, value)),
            Block::Gap(gap) => {
                if gap.run_count() >= GapBlock::MAX_RUNS {
                    // One more run would not fit; switch before mutating.
                    self.convert_to_bits()?;
                    return self.set_value(offset, value);
                }
                gap.set_value(offset, value)
            }
            Block::Full => {
                if value {
                    return Ok(false);
                }
                let mut gap = GapBlock::full()?;
                gap.set_value(offset, false)?;
                *self = Block::Gap(gap);
                Ok(true)
            }
        }
    }

    /// Flips the bit, returns its new value.
    pub fn flip(&mut self, offset: u16) -> Result<bool> {
        if let Block::Bits(bits) = self {
            return Ok(bits.flip(offset));
        }
        let value = !self.contains(offset);
        self.set_value(offset, value)?;
        Ok(value)
    }

    /// Sets every bit of the half-open `range` to `value`.
    pub fn set_range(&mut self, range: Range<u32>, value: bool) -> Result<()> {
        if range.start >= range.end {
            return Ok(());
        }
        let replacement = match self {
            Block::Bits(bits) => {
                bits.set_range_value(range, value);
                return Ok(());
            }
            Block::Gap(gap) => Block::from_gap(gap.with_range(range, value)?)?,
            Block::Full if value => return Ok(()),
            Block::Full => Block::from_gap(GapBlock::full()?.with_range(range, false)?)?,
        };
        *self = replacement;
        Ok(())
    }

    /// Complements every bit of the block.
    pub fn invert(&mut self) -> Result<()> {
        let replacement = match self {
            Block::Bits(bits) => {
                bits.negate();
                return Ok(());
            }
            Block::Gap(gap) => Block::from_gap(gap.complement()?)?,
            Block::Full => Block::Gap(GapBlock::empty()),
        };
        *self = replacement;
        Ok(())
    }

    fn complemented(&self) -> Result<Block> {
        match self {
            Block::Bits(bits) => {
                let mut bits = bits.try_clone()?;
                bits.negate();
                Ok(Block::Bits(bits))
            }
            Block::Gap(gap) => Block::from_gap(gap.complement()?),
            Block::Full => Ok(Block::Gap(GapBlock::empty())),
        }
    }

    /// `self = self <op> other`. On failure the block keeps its previous
    /// content and representation.
    pub fn combine_with(&mut self, other: &Block, op: CombineOp) -> Result<()> {
        let replacement = match (&mut *self, other) {
            (Block::Full, src) => match op {
                CombineOp::And => Some(src.try_clone()?),
                CombineOp::Or => None,
                CombineOp::Sub | CombineOp::Xor => Some(src.complemented()?),
            },
            (dst, Block::Full) => match op {
                CombineOp::And => None,
                CombineOp::Or => Some(Block::Full),
                CombineOp::Sub => Some(Block::Gap(GapBlock::empty())),
                CombineOp::Xor => {
                    dst.invert()?;
                    None
                }
            },
            (Block::Bits(dst), Block::Bits(src)) => {
                combine_bits(dst, src, op);
                None
            }
            (Block::Bits(dst), Block::Gap(src)) => {
                combine_bits_with_runs(dst, src, op);
                None
            }
            (Block::Gap(dst), Block::Gap(src)) => Some(Block::from_gap(dst.combine(src, op)?)?),
            (Block::Gap(dst), Block::Bits(src)) => {
                let mut bits = dst.to_bits()?;
                combine_bits(&mut bits, src, op);
                Some(Block::Bits(bits))
            }
        };
        if let Some(block) = replacement {
            *self = block;
        }
        Ok(())
    }

    /// Lowest offset where the two blocks differ, with this block's bit
    /// value at that offset.
    pub fn first_difference(&self, other: &Block) -> Option<(u16, bool)> {
        let offset = match (self, other) {
            (Block::Bits(a), Block::Bits(b)) => a.first_difference(b)?,
            _ => set_ops::symmetric_difference_ranges(self.ranges(), other.ranges())
                .next()
                .map(|r| r.start as u16)?,
        };
        Some((offset, self.contains(offset)))
    }

    pub fn convert_to_bits(&mut self) -> Result<()> {
        let bits = match self {
            Block::Bits(_) => return Ok(()),
            Block::Gap(gap) => gap.to_bits()?,
            Block::Full => BitBlock::full()?,
        };
        log::trace!("block converted to bits");
        *self = Block::Bits(bits);
        Ok(())
    }

    pub fn convert_to_gap(&mut self) -> Result<()> {
        let gap = match self {
            Block::Bits(bits) => GapBlock::from_bits(bits)?,
            Block::Gap(_) => return Ok(()),
            Block::Full => GapBlock::full()?,
        };
        log::trace!("block converted to gap ({} runs)", gap.run_count());
        *self = Block::Gap(gap);
        Ok(())
    }

    /// Picks the smaller representation for the current content. Bit
    /// blocks go to GAP at `AUTO_GAP_RUNS` runs or fewer, or at
    /// `GapBlock::MAX_RUNS` when `mode` forces GAP compression. GAP blocks
    /// stay GAP up to `GapBlock::MAX_RUNS`, so a second pass changes
    /// nothing.
    pub fn optimize(&mut self, mode: OptimizeMode) -> Result<()> {
        match self {
            Block::Bits(bits) => {
                let limit = if mode.forces_gap() {
                    GapBlock::MAX_RUNS
                } else {
                    AUTO_GAP_RUNS
                };
                if bits.count_runs() <= limit {
                    self.convert_to_gap()?;
                }
            }
            Block::Gap(gap) => {
                if gap.run_count() > GapBlock::MAX_RUNS {
                    self.convert_to_bits()?;
                } else {
                    gap.compact();
                }
            }
            Block::Full => {}
        }
        Ok(())
    }

    /// Zeroes the block in place, keeping its storage. Returns `false` for
    /// a `Full` block, which has no storage to keep.
    pub fn clear_in_place(&mut self) -> bool {
        match self {
            Block::Bits(bits) => bits.clear(),
            Block::Gap(gap) => gap.clear(),
            Block::Full => return false,
        }
        true
    }

    pub fn heap_size_bytes(&self) -> usize {
        match self {
            Block::Bits(bits) => bits.heap_size_bytes(),
            Block::Gap(gap) => gap.heap_size_bytes(),
            Block::Full => 0,
        }
    }

    /// Maximal runs of ones, ascending.
    pub fn ranges(&self) -> BlockRanges<'_> {
        match self {
            Block::Bits(bits) => BlockRanges::Bits(bits.runs()),
            Block::Gap(gap) => BlockRanges::Gap(gap.runs().iter()),
            Block::Full => BlockRanges::Full(Some(0..BLOCK_BITS)),
        }
    }

    /// Offsets of the set bits, ascending.
    pub fn positions(&self) -> BlockPositions<'_> {
        match self {
            Block::Bits(bits) => BlockPositions::Bits(bits.positions()),
            Block::Gap(gap) => BlockPositions::Gap {
                runs: gap.runs().iter(),
                current: 0..0,
            },
            Block::Full => BlockPositions::Full(0..BLOCK_BITS),
        }
    }
}

fn combine_bits(dst: &mut BitBlock, src: &BitBlock, op: CombineOp) {
    match op {
        CombineOp::And => dst.and_with(src),
        CombineOp::Or => dst.or_with(src),
        CombineOp::Sub => dst.sub_with(src),
        CombineOp::Xor => dst.xor_with(src),
    }
}

/// Applies GAP runs directly to raw bits, without converting either side.
fn combine_bits_with_runs(dst: &mut BitBlock, src: &GapBlock, op: CombineOp) {
    match op {
        CombineOp::And => {
            for hole in set_ops::complement_ranges(BLOCK_BITS, src.ranges()) {
                dst.reset_range(hole);
            }
        }
        CombineOp::Or => src.ranges().for_each(|r| dst.set_range(r)),
        CombineOp::Sub => src.ranges().for_each(|r| dst.reset_range(r)),
        CombineOp::Xor => src.ranges().for_each(|r| dst.flip_range(r)),
    }
}

pub enum BlockRanges<'a> {
    Bits(bits::BitRuns<'a>),
    Gap(std::slice::Iter<'a, Run>),
    Full(Option<Range<u32>>),
}

impl Iterator for BlockRanges<'_> {
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Range<u32>> {
        match self {
            BlockRanges::Bits(it) => it.next(),
            BlockRanges::Gap(it) => it.next().map(Run::as_range),
            BlockRanges::Full(range) => range.take(),
        }
    }
}

pub enum BlockPositions<'a> {
    Bits(bits::BitPositions<'a>),
    Gap {
        runs: std::slice::Iter<'a, Run>,
        current: Range<u32>,
    },
    Full(Range<u32>),
}

impl Iterator for BlockPositions<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            BlockPositions::Bits(it) => it.next(),
            BlockPositions::Gap { runs, current } => loop {
                if let Some(pos) = current.next() {
                    return Some(pos);
                }
                *current = runs.next()?.as_range();
            },
            BlockPositions::Full(range) => range.next(),
        }
    }
}
