use crate::{
    StatusCode,
    block::{BLOCK_BITS, BLOCK_WORDS, BitBlock},
};

#[test]
fn test_set_and_contains() {
    let mut b = BitBlock::empty().unwrap();
    assert!(b.is_all_zero());
    assert!(b.set_value(0, true));
    assert!(!b.set_value(0, true));
    assert!(b.set_value(65535, true));
    assert!(b.contains(0));
    assert!(b.contains(65535));
    assert!(!b.contains(1));
    assert_eq!(b.count_ones(), 2);
    assert!(b.set_value(0, false));
    assert!(!b.set_value(0, false));
    assert_eq!(b.count_ones(), 1);

    assert!(b.flip(7));
    assert!(!b.flip(7));
}

#[test]
fn test_ranges_and_counts() {
    let mut b = BitBlock::empty().unwrap();
    b.set_range(10..200);
    assert_eq!(b.count_ones(), 190);
    assert_eq!(b.count_range(0..10), 0);
    assert_eq!(b.count_range(10..11), 1);
    assert_eq!(b.count_range(100..300), 100);
    assert_eq!(b.count_range(5..5), 0);
    assert_eq!(b.count_runs(), 1);

    b.reset_range(64..128);
    assert_eq!(b.count_ones(), 190 - 64);
    assert_eq!(b.count_runs(), 2);

    b.flip_range(0..BLOCK_BITS);
    assert_eq!(b.count_ones(), BLOCK_BITS - 126);
    assert_eq!(
        b.runs().collect::<Vec<_>>(),
        vec![0..10, 64..128, 200..BLOCK_BITS]
    );
}

#[test]
fn test_range_within_single_word() {
    let mut b = BitBlock::empty().unwrap();
    b.set_range(3..7);
    assert_eq!(b.words()[0], 0b1111000);
    b.set_range(64..128);
    assert_eq!(b.words()[1], u64::MAX);
    assert_eq!(b.count_range(0..BLOCK_BITS), 68);
}

#[test]
fn test_find_next() {
    let mut b = BitBlock::empty().unwrap();
    assert_eq!(b.find_next(0), None);
    b.set_value(70, true);
    b.set_value(1000, true);
    assert_eq!(b.find_next(0), Some(70));
    assert_eq!(b.find_next(70), Some(70));
    assert_eq!(b.find_next(71), Some(1000));
    assert_eq!(b.find_next(1001), None);
    assert_eq!(b.find_next(BLOCK_BITS), None);
    assert_eq!(b.find_next_zero(70), 71);
    assert_eq!(b.find_next_zero(0), 0);

    let full = BitBlock::full().unwrap();
    assert!(full.is_all_ones());
    assert_eq!(full.find_next_zero(0), BLOCK_BITS);
    assert_eq!(full.count_runs(), 1);
}

#[test]
fn test_positions_and_runs() {
    let positions = [0u32, 1, 2, 63, 64, 65, 4000, 65535];
    let mut b = BitBlock::empty().unwrap();
    for &p in &positions {
        b.set_value(p as u16, true);
    }
    assert_eq!(b.positions().collect::<Vec<_>>(), positions);
    assert_eq!(
        b.runs().collect::<Vec<_>>(),
        vec![0..3, 63..66, 4000..4001, 65535..65536]
    );
    assert_eq!(b.count_runs(), 4);
}

#[test]
fn test_word_ops() {
    let mut a = BitBlock::empty().unwrap();
    a.set_range(0..100);
    let mut b = BitBlock::empty().unwrap();
    b.set_range(50..150);

    let mut and = a.clone();
    and.and_with(&b);
    assert_eq!(and.runs().collect::<Vec<_>>(), vec![50..100]);

    let mut or = a.clone();
    or.or_with(&b);
    assert_eq!(or.count_ones(), 150);

    let mut xor = a.clone();
    xor.xor_with(&b);
    assert_eq!(xor.runs().collect::<Vec<_>>(), vec![0..50, 100..150]);

    let mut sub = a.clone();
    sub.sub_with(&b);
    assert_eq!(sub.runs().collect::<Vec<_>>(), vec![0..50]);

    assert_eq!(a.first_difference(&b), Some(0));
    assert_eq!(a.first_difference(&a.try_clone().unwrap()), None);
}

#[test]
fn test_negate() {
    let mut b = BitBlock::from_ranges([5..10].into_iter()).unwrap();
    b.negate();
    assert_eq!(b.count_ones(), BLOCK_BITS - 5);
    assert!(!b.contains(5));
    assert!(b.contains(4));
    assert_eq!(b.heap_size_bytes(), 8192);
}

#[test]
fn test_from_words() {
    let mut words = vec![0u64; BLOCK_WORDS];
    words[1] = 0b101;
    let b = BitBlock::from_words(&words).unwrap();
    assert_eq!(b.positions().collect::<Vec<_>>(), vec![64, 66]);

    let err = BitBlock::from_words(&words[..BLOCK_WORDS - 1]).unwrap_err();
    assert_eq!(err.status(), StatusCode::BadArgument);
    assert!(BitBlock::from_words(&[]).is_err());
}
