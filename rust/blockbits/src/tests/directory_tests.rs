use crate::{
    block::{Block, BlockKind, GapBlock},
    config::Strategy,
    directory::BlockDirectory,
};

fn indices(dir: &BlockDirectory) -> Vec<u32> {
    dir.iter().map(|(idx, _)| idx).collect()
}

#[test]
fn test_resolve() {
    assert_eq!(BlockDirectory::resolve(0), (0, 0));
    assert_eq!(BlockDirectory::resolve(65535), (0, 65535));
    assert_eq!(BlockDirectory::resolve(65536), (1, 0));
    assert_eq!(BlockDirectory::resolve(u32::MAX), (65535, 65535));
}

#[test]
fn test_get_or_create_and_iteration() {
    let mut dir = BlockDirectory::new();
    assert!(dir.is_empty());

    dir.get_or_create(5, Strategy::Bit)
        .unwrap()
        .set_value(1, true)
        .unwrap();
    dir.get_or_create(300, Strategy::Gap).unwrap();
    assert!(dir.insert(65535, Block::Full).unwrap().is_none());
    assert_eq!(dir.len(), 3);
    assert_eq!(indices(&dir), vec![5, 300, 65535]);
    assert_eq!(
        dir.iter_from(6).map(|(idx, _)| idx).collect::<Vec<_>>(),
        vec![300, 65535]
    );
    assert_eq!(dir.get(300).unwrap().kind(), BlockKind::Gap);
    assert!(dir.get(4).is_none());
    assert!(dir.get(70000).is_none());

    // An existing block is returned as is.
    let existing = dir.get_or_create(5, Strategy::Gap).unwrap();
    assert_eq!(existing.kind(), BlockKind::Bits);
    assert!(existing.contains(1));

    assert!(dir.remove(300).is_some());
    assert!(dir.remove(300).is_none());
    assert_eq!(indices(&dir), vec![5, 65535]);

    dir.truncate(6);
    assert_eq!(indices(&dir), vec![5]);
}

#[test]
fn test_retain() {
    let mut dir = BlockDirectory::new();
    for idx in [1u32, 2, 3, 700, 701] {
        dir.insert(idx, Block::Full).unwrap();
    }
    dir.retain(|idx, _| idx % 2 == 1);
    assert_eq!(indices(&dir), vec![1, 3, 701]);
}

#[test]
fn test_shrink_releases_tables() {
    let mut dir = BlockDirectory::new();
    dir.insert(1000, Block::Gap(GapBlock::full().unwrap())).unwrap();
    let before = dir.heap_size_bytes();
    assert!(before > 0);
    dir.remove(1000);
    dir.shrink();
    assert_eq!(dir.heap_size_bytes(), 0);
}

#[test]
fn test_clear_keeps_or_releases() {
    let mut dir = BlockDirectory::new();
    dir.get_or_create(0, Strategy::Bit)
        .unwrap()
        .set_value(9, true)
        .unwrap();
    dir.insert(1, Block::Full).unwrap();

    dir.clear(false);
    assert_eq!(indices(&dir), vec![0]);
    assert!(dir.get(0).unwrap().is_empty());

    dir.clear(true);
    assert!(dir.is_empty());
    assert_eq!(dir.heap_size_bytes(), 0);
}

#[test]
fn test_try_clone_is_deep() {
    let mut dir = BlockDirectory::new();
    dir.get_or_create(2, Strategy::Gap)
        .unwrap()
        .set_value(4, true)
        .unwrap();
    let copy = dir.try_clone().unwrap();
    dir.get_mut(2).unwrap().set_value(4, false).unwrap();
    assert!(copy.get(2).unwrap().contains(4));
    assert!(!dir.get(2).unwrap().contains(4));
}
