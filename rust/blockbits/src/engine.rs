use blockbits_common::Result;

use crate::{bvector::BitVector, config::BitVectorConfig};

/// Context for creating vectors with shared defaults.
///
/// Holds no process-wide state; `init` may be called any number of times.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: BitVectorConfig,
}

impl Engine {
    pub fn init() -> Engine {
        Engine::default()
    }

    pub fn with_config(config: BitVectorConfig) -> Engine {
        Engine { config }
    }

    pub fn config(&self) -> &BitVectorConfig {
        &self.config
    }

    /// A new empty vector of `max_bits` bits (0 means the maximum size),
    /// using the engine's block strategy.
    pub fn construct(&self, max_bits: u32) -> BitVector {
        BitVector::with_config(&self.config.clone().with_size(max_bits))
    }

    /// A deep copy of `source`.
    pub fn construct_copy(&self, source: &BitVector) -> Result<BitVector> {
        source.try_clone()
    }
}
