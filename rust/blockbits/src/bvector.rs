//! The bit vector: declared size, block strategy and the block directory.

use blockbits_common::{Error, Result};

use crate::{
    block::BLOCK_BITS,
    config::{BitVectorConfig, Strategy},
    directory::BlockDirectory,
};

/// A mutable bit vector over `0..size`, `size <= BitVector::MAX_SIZE`.
///
/// Storage is a sparse directory of fixed-span blocks. Absent blocks read
/// as zeros, and bits at or beyond `size` are always zero.
#[derive(Clone)]
pub struct BitVector {
    pub(crate) blocks: BlockDirectory,
    pub(crate) size: u32,
    pub(crate) strategy: Strategy,
}

impl BitVector {
    /// Largest declared size. Index `u32::MAX` itself is never valid.
    pub const MAX_SIZE: u32 = u32::MAX;

    /// An empty vector of the maximum size.
    pub fn new() -> BitVector {
        Self::with_size(0)
    }

    /// An empty vector of `max_bits` bits; 0 means [`Self::MAX_SIZE`].
    pub fn with_size(max_bits: u32) -> BitVector {
        Self::with_config(&BitVectorConfig::default().with_size(max_bits))
    }

    pub fn with_config(config: &BitVectorConfig) -> BitVector {
        BitVector {
            blocks: BlockDirectory::new(),
            size: config.effective_size(),
            strategy: config.strategy,
        }
    }

    /// Builds a vector of `max_bits` bits with the given positions set.
    pub fn from_positions(
        max_bits: u32,
        positions: impl IntoIterator<Item = u32>,
    ) -> Result<BitVector> {
        let mut bv = Self::with_size(max_bits);
        for pos in positions {
            bv.set(pos, true)?;
        }
        Ok(bv)
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<BitVector> {
        Ok(BitVector {
            blocks: self.blocks.try_clone()?,
            size: self.size,
            strategy: self.strategy,
        })
    }

    /// Exchanges the contents (including declared sizes) of two vectors.
    pub fn swap(&mut self, other: &mut BitVector) {
        std::mem::swap(self, other);
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Changes the declared size; 0 means [`Self::MAX_SIZE`]. Shrinking
    /// drops every set bit at or beyond the new size.
    pub fn set_size(&mut self, new_size: u32) -> Result<()> {
        let new_size = if new_size == 0 {
            Self::MAX_SIZE
        } else {
            new_size
        };
        let shrinking = new_size < self.size;
        self.size = new_size;
        if shrinking {
            self.clear_tail()?;
        }
        log::debug!("bit vector resized to {new_size}");
        Ok(())
    }

    /// Index of the block holding the last valid bit.
    #[inline]
    pub(crate) fn last_block(&self) -> u32 {
        (self.size - 1) / BLOCK_BITS
    }

    #[inline]
    pub(crate) fn check_index(&self, index: u32) -> Result<()> {
        if index < self.size {
            Ok(())
        } else {
            Err(Error::index_out_of_range(index as u64, self.size as u64))
        }
    }

    /// Validates a closed interval `[left, right]`.
    pub(crate) fn check_interval(&self, left: u32, right: u32) -> Result<()> {
        if left > right {
            return Err(Error::inverted_interval(left as u64, right as u64));
        }
        self.check_index(right)
    }

    /// Zeroes every bit at or beyond the declared size.
    pub(crate) fn clear_tail(&mut self) -> Result<()> {
        let (block_idx, offset) = BlockDirectory::resolve(self.size);
        if offset == 0 {
            self.blocks.truncate(block_idx);
            return Ok(());
        }
        if block_idx as usize + 1 < crate::directory::MAX_BLOCKS {
            self.blocks.truncate(block_idx + 1);
        }
        if let Some(block) = self.blocks.get_mut(block_idx) {
            block.set_range(offset as u32..BLOCK_BITS, false)?;
            if block.is_empty() {
                self.blocks.remove(block_idx);
            }
        }
        Ok(())
    }
}

impl Default for BitVector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("size", &self.size)
            .field("strategy", &self.strategy)
            .field("blocks", &self.blocks.len())
            .field("count", &self.count())
            .finish()
    }
}
