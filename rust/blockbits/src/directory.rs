//! Two-level sparse map from block index to materialized block.

use blockbits_common::Result;

use crate::{
    block::{BLOCK_BITS, Block},
    config::Strategy,
};

/// Number of block slots in one second-level table.
pub const TABLE_LEN: usize = 256;

/// Number of blocks needed to cover the whole 32-bit index space.
pub const MAX_BLOCKS: usize = (u32::MAX as usize + 1) / BLOCK_BITS as usize;

type BlockTable = Box<[Option<Block>]>;

/// The top level holds lazily allocated tables of `TABLE_LEN` slots and
/// only grows as far as the highest table in use. A slot holding `None`
/// is an absent (all-zero) block.
#[derive(Debug, Clone, Default)]
pub struct BlockDirectory {
    tables: Vec<Option<BlockTable>>,
}

impl BlockDirectory {
    pub fn new() -> BlockDirectory {
        Default::default()
    }

    /// Splits a bit index into its block index and block-relative offset.
    #[inline]
    pub fn resolve(index: u32) -> (u32, u16) {
        (index / BLOCK_BITS, (index % BLOCK_BITS) as u16)
    }

    #[inline]
    fn split(block_idx: u32) -> (usize, usize) {
        let block_idx = block_idx as usize;
        (block_idx / TABLE_LEN, block_idx % TABLE_LEN)
    }

    /// Number of materialized blocks.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn get(&self, block_idx: u32) -> Option<&Block> {
        let (t, s) = Self::split(block_idx);
        self.tables.get(t)?.as_ref()?[s].as_ref()
    }

    pub fn get_mut(&mut self, block_idx: u32) -> Option<&mut Block> {
        let (t, s) = Self::split(block_idx);
        self.tables.get_mut(t)?.as_mut()?[s].as_mut()
    }

    fn slot_mut(&mut self, block_idx: u32) -> Result<&mut Option<Block>> {
        let (t, s) = Self::split(block_idx);
        if t >= self.tables.len() {
            self.tables.try_reserve(t + 1 - self.tables.len())?;
            self.tables.resize_with(t + 1, || None);
        }
        let table = match self.tables[t].take() {
            Some(table) => table,
            None => new_table()?,
        };
        Ok(&mut self.tables[t].insert(table)[s])
    }

    /// Returns the block, materializing a zero block of the given strategy
    /// when it is absent.
    pub fn get_or_create(&mut self, block_idx: u32, strategy: Strategy) -> Result<&mut Block> {
        let slot = self.slot_mut(block_idx)?;
        let block = match slot.take() {
            Some(block) => block,
            None => Block::empty(strategy)?,
        };
        Ok(slot.insert(block))
    }

    /// Stores a block, returning the one it replaced.
    pub fn insert(&mut self, block_idx: u32, block: Block) -> Result<Option<Block>> {
        Ok(self.slot_mut(block_idx)?.replace(block))
    }

    pub fn remove(&mut self, block_idx: u32) -> Option<Block> {
        let (t, s) = Self::split(block_idx);
        self.tables.get_mut(t)?.as_mut()?[s].take()
    }

    /// Drops every block with index `first_removed` and above.
    pub fn truncate(&mut self, first_removed: u32) {
        let (t, s) = Self::split(first_removed);
        if let Some(Some(table)) = self.tables.get_mut(t) {
            table[s..].iter_mut().for_each(|slot| *slot = None);
        }
        self.tables.truncate(t + 1);
    }

    /// Keeps only the blocks for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(u32, &mut Block) -> bool) {
        for (t, table) in self.tables.iter_mut().enumerate() {
            let Some(table) = table else { continue };
            for (s, slot) in table.iter_mut().enumerate() {
                let Some(block) = slot else { continue };
                if !f((t * TABLE_LEN + s) as u32, block) {
                    *slot = None;
                }
            }
        }
    }

    /// Releases tables without blocks and trims the top level.
    pub fn shrink(&mut self) {
        for table in self.tables.iter_mut() {
            if table
                .as_ref()
                .is_some_and(|t| t.iter().all(|slot| slot.is_none()))
            {
                *table = None;
            }
        }
        while matches!(self.tables.last(), Some(None)) {
            self.tables.pop();
        }
        self.tables.shrink_to_fit();
    }

    /// Drops all blocks. Without `release_memory`, bit and GAP blocks are
    /// zeroed in place and keep their storage.
    pub fn clear(&mut self, release_memory: bool) {
        if release_memory {
            self.tables = Vec::new();
        } else {
            self.retain(|_, block| block.clear_in_place());
        }
    }

    /// Blocks in ascending index order.
    pub fn iter(&self) -> Blocks<'_> {
        self.iter_from(0)
    }

    /// Blocks with index `block_idx` and above, ascending.
    pub fn iter_from(&self, block_idx: u32) -> Blocks<'_> {
        let (table_idx, slot_idx) = Self::split(block_idx);
        Blocks {
            tables: &self.tables,
            table_idx,
            slot_idx,
        }
    }

    pub fn try_clone(&self) -> Result<BlockDirectory> {
        let mut tables = Vec::new();
        tables.try_reserve_exact(self.tables.len())?;
        for table in &self.tables {
            let copy = match table {
                Some(table) => {
                    let mut copy = new_table()?;
                    for (dst, src) in copy.iter_mut().zip(table.iter()) {
                        if let Some(block) = src {
                            *dst = Some(block.try_clone()?);
                        }
                    }
                    Some(copy)
                }
                None => None,
            };
            tables.push(copy);
        }
        Ok(BlockDirectory { tables })
    }

    /// Memory held by the directory itself and by every block.
    pub fn heap_size_bytes(&self) -> usize {
        let top = self.tables.capacity() * std::mem::size_of::<Option<BlockTable>>();
        let tables = self
            .tables
            .iter()
            .flatten()
            .map(|t| t.len() * std::mem::size_of::<Option<Block>>())
            .sum::<usize>();
        let blocks = self.iter().map(|(_, b)| b.heap_size_bytes()).sum::<usize>();
        top + tables + blocks
    }
}

fn new_table() -> Result<BlockTable> {
    let mut table = Vec::new();
    table.try_reserve_exact(TABLE_LEN)?;
    table.resize_with(TABLE_LEN, || None);
    Ok(table.into_boxed_slice())
}

/// Iterator over `(block index, block)` pairs in ascending order.
pub struct Blocks<'a> {
    tables: &'a [Option<BlockTable>],
    table_idx: usize,
    slot_idx: usize,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = (u32, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let table = self.tables.get(self.table_idx)?;
            if let Some(table) = table {
                while self.slot_idx < TABLE_LEN {
                    let s = self.slot_idx;
                    self.slot_idx += 1;
                    if let Some(block) = &table[s] {
                        return Some(((self.table_idx * TABLE_LEN + s) as u32, block));
                    }
                }
            }
            self.table_idx += 1;
            self.slot_idx = 0;
        }
    }
}
