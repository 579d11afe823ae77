//! Read-only queries. None of these change content or representation.

use std::cmp::Ordering;

use blockbits_common::Result;
use itertools::{EitherOrBoth, Itertools};

use crate::{
    block::{BLOCK_BITS, BlockPositions},
    bvector::BitVector,
    directory::{BlockDirectory, Blocks},
};

impl BitVector {
    pub fn get(&self, index: u32) -> Result<bool> {
        self.check_index(index)?;
        let (block_idx, offset) = BlockDirectory::resolve(index);
        Ok(self
            .blocks
            .get(block_idx)
            .is_some_and(|block| block.contains(offset)))
    }

    /// Number of set bits.
    pub fn count(&self) -> u64 {
        self.blocks
            .iter()
            .map(|(_, block)| block.count() as u64)
            .sum()
    }

    /// Number of set bits in the closed interval `[left, right]`.
    pub fn count_range(&self, left: u32, right: u32) -> Result<u64> {
        self.check_interval(left, right)?;
        let (first_block, first_offset) = BlockDirectory::resolve(left);
        let (last_block, last_offset) = BlockDirectory::resolve(right);

        let mut count = 0u64;
        for (block_idx, block) in self.blocks.iter_from(first_block) {
            if block_idx > last_block {
                break;
            }
            let start = if block_idx == first_block {
                first_offset as u32
            } else {
                0
            };
            let end = if block_idx == last_block {
                last_offset as u32 + 1
            } else {
                BLOCK_BITS
            };
            count += block.count_range(start..end) as u64;
        }
        Ok(count)
    }

    /// Whether any bit is set. Stops at the first non-empty block.
    pub fn any(&self) -> bool {
        self.blocks.iter().any(|(_, block)| !block.is_empty())
    }

    pub fn get_first(&self) -> Option<u32> {
        self.find_from(0)
    }

    /// First set bit strictly after `index`.
    pub fn get_next(&self, index: u32) -> Result<Option<u32>> {
        self.check_index(index)?;
        Ok(index.checked_add(1).and_then(|next| self.find_from(next)))
    }

    /// First set bit at or after `index`; `None` past the end.
    pub(crate) fn find_from(&self, index: u32) -> Option<u32> {
        if index >= self.size {
            return None;
        }
        let (first_block, offset) = BlockDirectory::resolve(index);
        self.blocks.iter_from(first_block).find_map(|(block_idx, block)| {
            let from = if block_idx == first_block {
                offset as u32
            } else {
                0
            };
            block
                .find_next(from)
                .map(|pos| block_idx * BLOCK_BITS + pos as u32)
        })
    }

    /// Lexicographic comparison by bit content, from index 0 upward. At the
    /// lowest differing index, the vector holding the one is greater.
    /// Declared sizes are not compared.
    pub fn compare(&self, other: &BitVector) -> Ordering {
        let pairs = self
            .blocks
            .iter()
            .merge_join_by(other.blocks.iter(), |(a, _), (b, _)| a.cmp(b));
        for pair in pairs {
            // Value of `self` at the lowest differing bit of this block pair.
            let lhs_value = match pair {
                EitherOrBoth::Both((_, a), (_, b)) => a.first_difference(b).map(|(_, v)| v),
                EitherOrBoth::Left((_, a)) => (!a.is_empty()).then_some(true),
                EitherOrBoth::Right((_, b)) => (!b.is_empty()).then_some(false),
            };
            match lhs_value {
                Some(true) => return Ordering::Greater,
                Some(false) => return Ordering::Less,
                None => {}
            }
        }
        Ordering::Equal
    }

    /// Same declared size and same set bits.
    pub fn is_equal_to(&self, other: &BitVector) -> bool {
        self.size == other.size && self.compare(other) == Ordering::Equal
    }

    /// Set bits in ascending order.
    pub fn positions(&self) -> Positions<'_> {
        Positions {
            blocks: self.blocks.iter(),
            current: None,
        }
    }
}

/// Iterator over the set bits of a [`BitVector`], ascending.
pub struct Positions<'a> {
    blocks: Blocks<'a>,
    current: Option<(u32, BlockPositions<'a>)>,
}

impl Iterator for Positions<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some((base, positions)) = &mut self.current {
                if let Some(pos) = positions.next() {
                    return Some(*base + pos);
                }
            }
            let (block_idx, block) = self.blocks.next()?;
            self.current = Some((block_idx * BLOCK_BITS, block.positions()));
        }
    }
}
