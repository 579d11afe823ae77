mod bit_block_tests;
mod block_tests;
mod directory_tests;

use std::collections::BTreeSet;

use crate::{BitVector, BitVectorConfig, Strategy};

/// Clustered random positions below `max`: isolated bits, short runs and
/// empty stretches.
pub(crate) fn random_positions(max: u32) -> BTreeSet<u32> {
    let mut set = BTreeSet::new();
    let mut pos = 0u32;
    while pos < max {
        match fastrand::u8(0..3) {
            0 => {
                set.insert(pos);
                pos += fastrand::u32(1..50);
            }
            1 => {
                let end = (pos + fastrand::u32(1..300)).min(max);
                set.extend(pos..end);
                pos = end + fastrand::u32(1..100);
            }
            _ => pos += fastrand::u32(1..2000),
        }
    }
    set
}

pub(crate) fn build(size: u32, strategy: Strategy, positions: &BTreeSet<u32>) -> BitVector {
    let config = BitVectorConfig::default()
        .with_size(size)
        .with_strategy(strategy);
    let mut bv = BitVector::with_config(&config);
    for &pos in positions {
        bv.set(pos, true).unwrap();
    }
    bv
}

pub(crate) fn collect(bv: &BitVector) -> Vec<u32> {
    bv.positions().collect()
}
