//! Bit, range and whole-vector updates.

use blockbits_common::Result;

use crate::{
    block::{BLOCK_BITS, Block},
    bvector::BitVector,
    directory::BlockDirectory,
};

impl BitVector {
    /// Sets bit `index` to `value`. Returns whether the bit changed.
    ///
    /// Clearing a bit never materializes a block.
    pub fn set(&mut self, index: u32, value: bool) -> Result<bool> {
        self.check_index(index)?;
        let (block_idx, offset) = BlockDirectory::resolve(index);
        if value {
            self.blocks
                .get_or_create(block_idx, self.strategy)?
                .set_value(offset, true)
        } else {
            match self.blocks.get_mut(block_idx) {
                Some(block) => block.set_value(offset, false),
                None => Ok(false),
            }
        }
    }

    /// Sets bit `index` to `value` only if it currently equals `expected`.
    /// Returns whether the bit changed.
    pub fn set_conditional(&mut self, index: u32, value: bool, expected: bool) -> Result<bool> {
        if self.get(index)? != expected {
            return Ok(false);
        }
        self.set(index, value)
    }

    /// Flips bit `index`, returns its new value.
    pub fn flip(&mut self, index: u32) -> Result<bool> {
        self.check_index(index)?;
        let (block_idx, offset) = BlockDirectory::resolve(index);
        match self.blocks.get_mut(block_idx) {
            Some(block) => block.flip(offset),
            None => self
                .blocks
                .get_or_create(block_idx, self.strategy)?
                .set_value(offset, true)
                .map(|_| true),
        }
    }

    /// Sets every bit in `0..size`.
    pub fn set_all(&mut self) -> Result<()> {
        self.set_range(0, self.size - 1, true)
    }

    /// Sets every bit to zero. With `release_memory` all block storage is
    /// freed, otherwise blocks are zeroed in place for reuse.
    pub fn clear(&mut self, release_memory: bool) {
        self.blocks.clear(release_memory);
    }

    /// Sets every bit of the closed interval `[left, right]` to `value`.
    /// Whole blocks are replaced by a full sentinel or dropped, so no
    /// per-bit work is done for them.
    pub fn set_range(&mut self, left: u32, right: u32, value: bool) -> Result<()> {
        self.check_interval(left, right)?;
        let (first_block, first_offset) = BlockDirectory::resolve(left);
        let (last_block, last_offset) = BlockDirectory::resolve(right);

        for block_idx in first_block..=last_block {
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

            if start == 0 && end == BLOCK_BITS {
                if value {
                    self.blocks.insert(block_idx, Block::Full)?;
                } else {
                    self.blocks.remove(block_idx);
                }
            } else if value {
                self.blocks
                    .get_or_create(block_idx, self.strategy)?
                    .set_range(start..end, true)?;
            } else if let Some(block) = self.blocks.get_mut(block_idx) {
                block.set_range(start..end, false)?;
            }
        }
        Ok(())
    }

    /// Complements every bit in `0..size`.
    pub fn invert(&mut self) -> Result<()> {
        for block_idx in 0..=self.last_block() {
            match self.blocks.get_mut(block_idx) {
                Some(block) => {
                    block.invert()?;
                    if block.is_empty() {
                        self.blocks.remove(block_idx);
                    }
                }
                None => {
                    self.blocks.insert(block_idx, Block::Full)?;
                }
            }
        }
        self.clear_tail()
    }

    /// Clears the first set bit at or after `index` and returns the next
    /// set bit after it, if any. Returns `None` without changes when no bit
    /// is set at or after `index`.
    pub fn extract_next(&mut self, index: u32) -> Result<Option<u32>> {
        self.check_index(index)?;
        let Some(pos) = self.find_from(index) else {
            return Ok(None);
        };
        self.set(pos, false)?;
        Ok(pos.checked_add(1).and_then(|next| self.find_from(next)))
    }

    /// Clears the first set bit at or after `index` and returns it.
    pub fn take_next(&mut self, index: u32) -> Result<Option<u32>> {
        self.check_index(index)?;
        let Some(pos) = self.find_from(index) else {
            return Ok(None);
        };
        self.set(pos, false)?;
        Ok(Some(pos))
    }
}
