use std::collections::BTreeSet;

use crate::{
    block::{AUTO_GAP_RUNS, BLOCK_BITS, BitBlock, Block, BlockKind, GapBlock},
    combine::CombineOp,
    config::Strategy,
    optimize::OptimizeMode,
};

fn build(kind: BlockKind, positions: &BTreeSet<u32>) -> Block {
    match kind {
        BlockKind::Bits => {
            let mut bits = BitBlock::empty().unwrap();
            for &p in positions {
                bits.set_value(p as u16, true);
            }
            Block::Bits(bits)
        }
        BlockKind::Gap => {
            Block::Gap(GapBlock::from_ranges(positions.iter().map(|&p| p..p + 1)).unwrap())
        }
        BlockKind::Full => Block::Full,
    }
}

fn positions(block: &Block) -> Vec<u32> {
    block.positions().collect()
}

fn apply(op: CombineOp, a: &BTreeSet<u32>, b: &BTreeSet<u32>) -> Vec<u32> {
    match op {
        CombineOp::And => a.intersection(b).copied().collect(),
        CombineOp::Or => a.union(b).copied().collect(),
        CombineOp::Sub => a.difference(b).copied().collect(),
        CombineOp::Xor => a.symmetric_difference(b).copied().collect(),
    }
}

const OPS: [CombineOp; 4] = [CombineOp::And, CombineOp::Or, CombineOp::Sub, CombineOp::Xor];

#[test]
fn test_empty_by_strategy() {
    let bits = Block::empty(Strategy::Bit).unwrap();
    assert_eq!(bits.kind(), BlockKind::Bits);
    assert!(bits.is_empty());
    let gap = Block::empty(Strategy::Gap).unwrap();
    assert_eq!(gap.kind(), BlockKind::Gap);
    assert!(gap.is_empty());
    assert_eq!(gap.heap_size_bytes(), 0);
}

#[test]
fn test_gap_overflow_converts_to_bits() {
    let mut block = Block::empty(Strategy::Gap).unwrap();
    for i in 0..GapBlock::MAX_RUNS as u32 {
        block.set_value((i * 2) as u16, true).unwrap();
    }
    assert_eq!(block.kind(), BlockKind::Gap);
    assert_eq!(block.run_count(), GapBlock::MAX_RUNS);

    block.set_value(60000, true).unwrap();
    assert_eq!(block.kind(), BlockKind::Bits);
    assert_eq!(block.count(), GapBlock::MAX_RUNS as u32 + 1);
    assert!(block.contains(60000));
    assert!(block.contains(0));
}

#[test]
fn test_gap_range_overflow_converts_to_bits() {
    let mut block = Block::Gap(GapBlock::from_ranges(
        (0..GapBlock::MAX_RUNS as u32).map(|i| i * 4..i * 4 + 2),
    )
    .unwrap());
    assert_eq!(block.kind(), BlockKind::Gap);
    block.set_range(60000..60010, true).unwrap();
    assert_eq!(block.kind(), BlockKind::Bits);
    assert_eq!(block.count(), GapBlock::MAX_RUNS as u32 * 2 + 10);
}

#[test]
fn test_full_block_mutation() {
    let mut block = Block::Full;
    assert!(!block.set_value(5, true).unwrap());
    assert!(block.set_value(5, false).unwrap());
    assert_eq!(block.kind(), BlockKind::Gap);
    assert_eq!(block.count(), BLOCK_BITS - 1);

    let mut block = Block::Full;
    block.set_range(0..100, true).unwrap();
    assert_eq!(block.kind(), BlockKind::Full);
    block.set_range(0..100, false).unwrap();
    assert_eq!(block.count(), BLOCK_BITS - 100);
    assert_eq!(block.find_next(0), Some(100));

    let mut block = Block::Full;
    assert!(!block.flip(9).unwrap());
    assert!(!block.contains(9));

    let mut block = Block::Full;
    block.invert().unwrap();
    assert!(block.is_empty());
}

#[test]
fn test_count_range_by_kind() {
    let set = (100..300).collect::<BTreeSet<u32>>();
    for kind in [BlockKind::Bits, BlockKind::Gap] {
        let block = build(kind, &set);
        assert_eq!(block.count(), 200);
        assert_eq!(block.count_range(0..150), 50);
        assert_eq!(block.count_range(299..BLOCK_BITS), 1);
        assert_eq!(block.run_count(), 1);
    }
    assert_eq!(Block::Full.count_range(10..20), 10);
}

#[test]
fn test_combine_matches_across_representations() {
    let a = (0..6000)
        .step_by(3)
        .chain(10000..12000)
        .collect::<BTreeSet<u32>>();
    let b = (0..9000)
        .step_by(5)
        .chain(11000..13000)
        .collect::<BTreeSet<u32>>();

    for op in OPS {
        let expected = apply(op, &a, &b);
        for ka in [BlockKind::Bits, BlockKind::Gap] {
            for kb in [BlockKind::Bits, BlockKind::Gap] {
                let mut dst = build(ka, &a);
                let src = build(kb, &b);
                dst.combine_with(&src, op).unwrap();
                assert_eq!(positions(&dst), expected, "{op:?} {ka:?} {kb:?}");
            }
        }
    }
}

#[test]
fn test_combine_with_full() {
    let full = (0..BLOCK_BITS).collect::<BTreeSet<u32>>();
    let some = (0..5000)
        .step_by(7)
        .chain(30000..31000)
        .collect::<BTreeSet<u32>>();

    for op in OPS {
        for kind in [BlockKind::Bits, BlockKind::Gap] {
            let mut dst = Block::Full;
            dst.combine_with(&build(kind, &some), op).unwrap();
            assert_eq!(positions(&dst), apply(op, &full, &some), "full {op:?} {kind:?}");

            let mut dst = build(kind, &some);
            dst.combine_with(&Block::Full, op).unwrap();
            assert_eq!(positions(&dst), apply(op, &some, &full), "{kind:?} {op:?} full");
        }
        let mut dst = Block::Full;
        dst.combine_with(&Block::Full, op).unwrap();
        assert_eq!(positions(&dst), apply(op, &full, &full), "full {op:?} full");
    }
}

#[test]
fn test_first_difference() {
    let a = build(BlockKind::Bits, &[1, 5, 9].into());
    let b = build(BlockKind::Gap, &[1, 5, 10].into());
    assert_eq!(a.first_difference(&b), Some((9, true)));
    assert_eq!(b.first_difference(&a), Some((9, false)));
    assert_eq!(
        a.first_difference(&build(BlockKind::Gap, &[1, 5, 9].into())),
        None
    );
    assert_eq!(
        a.first_difference(&build(BlockKind::Bits, &[1, 5, 9].into())),
        None
    );
    assert_eq!(
        Block::Full.first_difference(&build(BlockKind::Bits, &[0, 1, 2].into())),
        Some((3, true))
    );
    assert_eq!(Block::Full.first_difference(&Block::Full), None);
}

#[test]
fn test_optimize_picks_representation() {
    let mut block = build(BlockKind::Bits, &(0..10).collect());
    block.optimize(OptimizeMode::Compact).unwrap();
    assert_eq!(block.kind(), BlockKind::Gap);

    let sparse = (0..=AUTO_GAP_RUNS as u32).map(|i| i * 2).collect();
    let mut block = build(BlockKind::Bits, &sparse);
    block.optimize(OptimizeMode::Compact).unwrap();
    assert_eq!(block.kind(), BlockKind::Bits);
    block.optimize(OptimizeMode::GapCompress).unwrap();
    assert_eq!(block.kind(), BlockKind::Gap);
    // A GAP block below the hard limit stays GAP in every mode.
    block.optimize(OptimizeMode::Compact).unwrap();
    assert_eq!(block.kind(), BlockKind::Gap);
    assert_eq!(block.count(), AUTO_GAP_RUNS as u32 + 1);
}

#[test]
fn test_clear_in_place() {
    let mut block = build(BlockKind::Bits, &(0..100).collect());
    assert!(block.clear_in_place());
    assert!(block.is_empty());
    assert_eq!(block.kind(), BlockKind::Bits);
    assert!(!Block::Full.clear_in_place());
}
