use crate::bvector::BitVector;

/// Representation used when a zero block is first materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Raw bit blocks.
    #[default]
    Bit,
    /// Run-length (GAP) blocks, converted to bits once they grow too
    /// fragmented.
    Gap,
}

impl Strategy {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Strategy::Bit => 0,
            Strategy::Gap => 1,
        }
    }

    pub(crate) fn from_byte(value: u8) -> Option<Strategy> {
        match value {
            0 => Some(Strategy::Bit),
            1 => Some(Strategy::Gap),
            _ => None,
        }
    }
}

/// Construction parameters of a [`BitVector`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVectorConfig {
    /// Declared size in bits; valid indices are `0..size`. Zero means
    /// [`BitVector::MAX_SIZE`].
    pub size: u32,
    pub strategy: Strategy,
}

impl BitVectorConfig {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn effective_size(&self) -> u32 {
        if self.size == 0 {
            BitVector::MAX_SIZE
        } else {
            self.size
        }
    }
}
