//! Self-describing binary BLOB codec.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u32 magic | u32 blob_len | u32 size | u8 strategy | u32 block_count
//! block_count x { u16 block_index | u8 kind | payload }
//!     kind 0 (bits): 1024 x u64
//!     kind 1 (gap):  u16 run_count, run_count x (u16 first, u16 last)
//!     kind 2 (full): no payload
//! u64 xxh3 checksum of everything before it
//! ```
//!
//! Block indices are strictly ascending and empty blocks are omitted.

use std::io::Write;

use blockbits_common::{Error, Result, verify_data};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    block::{BLOCK_BITS, BLOCK_BYTES, Block, BitBlock, GapBlock, Run},
    bvector::BitVector,
    config::{BitVectorConfig, Strategy},
    directory::MAX_BLOCKS,
};

/// "BKB1"
const FORMAT_MAGIC: u32 = u32::from_le_bytes(*b"BKB1");

const HEADER_LEN: usize = 4 + 4 + 4 + 1 + 4;
const BLOCK_HEADER_LEN: usize = 2 + 1;
const CHECKSUM_LEN: usize = 8;

const KIND_BITS: u8 = 0;
const KIND_GAP: u8 = 1;
const KIND_FULL: u8 = 2;

/// How a block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Bits,
    Gap { runs: usize },
    Full,
}

impl Encoding {
    /// Picks the smallest encoding; `None` for an empty block.
    fn choose(block: &Block) -> Option<Encoding> {
        let runs = block.run_count();
        if runs == 0 {
            return None;
        }
        if block.is_full() {
            return Some(Encoding::Full);
        }
        let gap = Encoding::Gap { runs };
        match block {
            Block::Bits(_) if gap.payload_len() >= BLOCK_BYTES => Some(Encoding::Bits),
            _ => Some(gap),
        }
    }

    fn kind(self) -> u8 {
        match self {
            Encoding::Bits => KIND_BITS,
            Encoding::Gap { .. } => KIND_GAP,
            Encoding::Full => KIND_FULL,
        }
    }

    fn payload_len(self) -> usize {
        match self {
            Encoding::Bits => BLOCK_BYTES,
            Encoding::Gap { runs } => 2 + 4 * runs,
            Encoding::Full => 0,
        }
    }
}

impl BitVector {
    /// Exact number of bytes [`Self::serialize`] writes.
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN
            + self
                .blocks
                .iter()
                .filter_map(|(_, block)| Encoding::choose(block))
                .map(|e| BLOCK_HEADER_LEN + e.payload_len())
                .sum::<usize>()
            + CHECKSUM_LEN
    }

    /// Cheap upper bound of the serialized size, from the in-memory size
    /// of every block.
    pub fn serialized_size_bound(&self) -> usize {
        HEADER_LEN
            + self
                .blocks
                .iter()
                .map(|(_, block)| {
                    BLOCK_HEADER_LEN
                        + match block {
                            Block::Bits(_) => BLOCK_BYTES,
                            Block::Gap(gap) => 2 + 4 * gap.run_count(),
                            Block::Full => 0,
                        }
                })
                .sum::<usize>()
            + CHECKSUM_LEN
    }

    /// Writes the BLOB into `buf` and returns its length. Fails with a
    /// range error when `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.serialized_len();
        if buf.len() < len {
            return Err(Error::dest_buffer_too_small(len, buf.len()));
        }
        let blob = &mut buf[..len];
        let (body, trailer) = blob.split_at_mut(len - CHECKSUM_LEN);

        let block_count = self
            .blocks
            .iter()
            .filter(|(_, block)| Encoding::choose(block).is_some())
            .count();

        let mut w: &mut [u8] = &mut *body;
        w.write_u32::<LittleEndian>(FORMAT_MAGIC)?;
        w.write_u32::<LittleEndian>(len as u32)?;
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u8(self.strategy.to_byte())?;
        w.write_u32::<LittleEndian>(block_count as u32)?;
        for (idx, block) in self.blocks.iter() {
            let Some(encoding) = Encoding::choose(block) else {
                continue;
            };
            w.write_u16::<LittleEndian>(idx as u16)?;
            w.write_u8(encoding.kind())?;
            write_payload(&mut w, block, encoding)?;
        }
        debug_assert!(w.is_empty());

        LittleEndian::write_u64(trailer, xxh3_64(body));
        Ok(len)
    }

    pub fn serialize_to_vec(&self) -> Result<Vec<u8>> {
        let len = self.serialized_len();
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
        self.serialize(&mut buf)?;
        Ok(buf)
    }

    /// Replaces the content, size and strategy of `self` with the decoded
    /// BLOB. On any error `self` is left unchanged.
    pub fn deserialize(&mut self, buf: &[u8]) -> Result<()> {
        *self = Self::from_bytes(buf)?;
        Ok(())
    }

    /// Decodes a BLOB. `buf` may extend past the end of the BLOB.
    pub fn from_bytes(buf: &[u8]) -> Result<BitVector> {
        if buf.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(Error::unexpected_end("header"));
        }
        let mut r = buf;
        let magic = read_u32(&mut r, "magic")?;
        verify_data!(magic, magic == FORMAT_MAGIC);
        let blob_len = read_u32(&mut r, "blob_len")? as usize;
        verify_data!(blob_len, blob_len >= HEADER_LEN + CHECKSUM_LEN);
        if blob_len > buf.len() {
            return Err(Error::unexpected_end("blob"));
        }

        let (body, trailer) = buf[..blob_len].split_at(blob_len - CHECKSUM_LEN);
        if xxh3_64(body) != LittleEndian::read_u64(trailer) {
            return Err(Error::checksum_mismatch("blob"));
        }

        let mut r = &body[8..];
        let size = read_u32(&mut r, "size")?;
        verify_data!(size, size != 0);
        let strategy = Strategy::from_byte(read_u8(&mut r, "strategy")?)
            .ok_or_else(|| Error::invalid_format("strategy", "unknown block strategy"))?;
        let block_count = read_u32(&mut r, "block_count")? as usize;
        verify_data!(block_count, block_count <= MAX_BLOCKS);

        let mut bv = BitVector::with_config(
            &BitVectorConfig::default()
                .with_size(size)
                .with_strategy(strategy),
        );
        let last_block = bv.last_block();
        // First offset of the last block that lies beyond the size.
        let tail_start = size - last_block * BLOCK_BITS;

        let mut prev_idx = None;
        for _ in 0..block_count {
            let idx = read_u16(&mut r, "block_index")? as u32;
            verify_data!(block_index, prev_idx.is_none_or(|prev| prev < idx));
            verify_data!(block_index, idx <= last_block);
            prev_idx = Some(idx);

            let block = read_block(&mut r)?;
            if idx == last_block && tail_start < BLOCK_BITS {
                verify_data!(
                    block_tail,
                    block.count_range(tail_start..BLOCK_BITS) == 0
                );
            }
            bv.blocks.insert(idx, block)?;
        }
        verify_data!(blob_len, r.is_empty());

        log::debug!(
            "decoded bit vector: size {size}, {block_count} blocks, {blob_len} bytes"
        );
        Ok(bv)
    }
}

fn write_payload(w: &mut impl Write, block: &Block, encoding: Encoding) -> Result<()> {
    match (encoding, block) {
        (Encoding::Full, _) => {}
        (Encoding::Gap { runs }, _) => {
            w.write_u16::<LittleEndian>(runs as u16)?;
            for range in block.ranges() {
                w.write_u16::<LittleEndian>(range.start as u16)?;
                w.write_u16::<LittleEndian>((range.end - 1) as u16)?;
            }
        }
        (Encoding::Bits, Block::Bits(bits)) => {
            for &word in bits.words() {
                w.write_u64::<LittleEndian>(word)?;
            }
        }
        (Encoding::Bits, _) => {
            return Err(Error::invalid_format(
                "block",
                "bit encoding is only chosen for raw bit blocks",
            ));
        }
    }
    Ok(())
}

fn read_block(r: &mut &[u8]) -> Result<Block> {
    match read_u8(r, "block_kind")? {
        KIND_BITS => {
            let mut bits = BitBlock::empty()?;
            r.read_u64_into::<LittleEndian>(bits.words_mut())
                .map_err(|_| Error::unexpected_end("bit_block"))?;
            Ok(Block::Bits(bits))
        }
        KIND_GAP => {
            let run_count = read_u16(r, "run_count")? as usize;
            verify_data!(run_count, run_count >= 1 && run_count <= GapBlock::MAX_RUNS);
            let mut runs = Vec::new();
            runs.try_reserve_exact(run_count)?;
            for _ in 0..run_count {
                let first = read_u16(r, "run")?;
                let last = read_u16(r, "run")?;
                runs.push(Run { first, last });
            }
            let gap = GapBlock::from_runs(runs);
            gap.check_invariants()?;
            Ok(Block::Gap(gap))
        }
        KIND_FULL => Ok(Block::Full),
        kind => Err(Error::invalid_format(
            "block_kind",
            format!("unknown block kind {kind}"),
        )),
    }
}

fn read_u8(r: &mut &[u8], element: &str) -> Result<u8> {
    r.read_u8().map_err(|_| Error::unexpected_end(element))
}

fn read_u16(r: &mut &[u8], element: &str) -> Result<u16> {
    r.read_u16::<LittleEndian>()
        .map_err(|_| Error::unexpected_end(element))
}

fn read_u32(r: &mut &[u8], element: &str) -> Result<u32> {
    r.read_u32::<LittleEndian>()
        .map_err(|_| Error::unexpected_end(element))
}
