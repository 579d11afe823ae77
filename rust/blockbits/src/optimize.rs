//! Representation optimizer and memory statistics.

use blockbits_common::{Error, Result};

use crate::{
    block::{Block, BlockKind},
    bvector::BitVector,
};

/// How aggressively [`BitVector::optimize`] compacts. Each mode includes
/// everything the lower ones do.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum OptimizeMode {
    /// Re-pick the smaller representation of every block and release
    /// spare capacity. Empty blocks stay materialized.
    #[default]
    Compact = 0,
    /// Also drop all-zero blocks and the directory tables left empty.
    FreeEmpty = 1,
    /// Also replace all-one blocks by the storage-free full sentinel.
    FreeEmptyAndFull = 2,
    /// Also store every bit block as GAP when its run count fits.
    GapCompress = 3,
}

impl OptimizeMode {
    pub fn frees_empty(self) -> bool {
        self >= OptimizeMode::FreeEmpty
    }

    pub fn frees_full(self) -> bool {
        self >= OptimizeMode::FreeEmptyAndFull
    }

    pub fn forces_gap(self) -> bool {
        self >= OptimizeMode::GapCompress
    }
}

impl TryFrom<i32> for OptimizeMode {
    type Error = Error;

    fn try_from(value: i32) -> Result<OptimizeMode> {
        match value {
            0 => Ok(OptimizeMode::Compact),
            1 => Ok(OptimizeMode::FreeEmpty),
            2 => Ok(OptimizeMode::FreeEmptyAndFull),
            3 => Ok(OptimizeMode::GapCompress),
            _ => Err(Error::invalid_arg(
                "mode",
                format!("unknown optimization mode {value}"),
            )),
        }
    }
}

/// Memory and representation summary of a vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Materialized raw bit blocks.
    pub bit_blocks: usize,
    /// Materialized GAP blocks.
    pub gap_blocks: usize,
    /// Full sentinel blocks.
    pub full_blocks: usize,
    /// Upper bound of the serialized size in bytes.
    pub max_serialize_mem: usize,
    /// Heap memory held by the directory and the blocks, in bytes.
    pub memory_used: usize,
}

impl BitVector {
    /// Compacts storage without changing content and returns the
    /// resulting statistics. Running the same mode twice changes nothing.
    ///
    /// On allocation failure the blocks processed so far stay optimized
    /// and the rest keep their representation.
    pub fn optimize(&mut self, mode: OptimizeMode) -> Result<Statistics> {
        let mut outcome = Ok(());
        self.blocks.retain(|_, block| {
            if outcome.is_err() {
                return true;
            }
            if mode.frees_empty() && block.is_empty() {
                return false;
            }
            if mode.frees_full() && block.is_full() {
                *block = Block::Full;
                return true;
            }
            outcome = block.optimize(mode);
            true
        });
        outcome?;
        if mode.frees_empty() {
            self.blocks.shrink();
        }

        let stats = self.calc_stat();
        log::debug!("optimize {mode:?}: {stats:?}");
        Ok(stats)
    }

    /// Current statistics. Does not modify the vector.
    pub fn calc_stat(&self) -> Statistics {
        let mut stats = Statistics::default();
        for (_, block) in self.blocks.iter() {
            match block.kind() {
                BlockKind::Bits => stats.bit_blocks += 1,
                BlockKind::Gap => stats.gap_blocks += 1,
                BlockKind::Full => stats.full_blocks += 1,
            }
        }
        stats.memory_used = std::mem::size_of::<BitVector>() + self.blocks.heap_size_bytes();
        stats.max_serialize_mem = self.serialized_size_bound();
        stats
    }
}
