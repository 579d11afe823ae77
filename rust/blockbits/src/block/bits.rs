//! Raw bit storage for one block.

use std::ops::Range;

use blockbits_common::{Result, verify_arg};

use super::{BLOCK_BITS, BLOCK_WORDS};

/// A dense block: `BLOCK_BITS` bits stored LSB-first in `BLOCK_WORDS` words.
///
/// Offsets are local to the block. Range arguments are half-open `u32`
/// ranges within `0..=BLOCK_BITS`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitBlock {
    words: Box<[u64]>,
}

impl BitBlock {
    /// An all-zero block.
    pub fn empty() -> Result<BitBlock> {
        Self::with_pattern(0)
    }

    /// An all-one block.
    pub fn full() -> Result<BitBlock> {
        Self::with_pattern(u64::MAX)
    }

    fn with_pattern(pattern: u64) -> Result<BitBlock> {
        let mut words = Vec::new();
        words.try_reserve_exact(BLOCK_WORDS)?;
        words.resize(BLOCK_WORDS, pattern);
        Ok(BitBlock {
            words: words.into_boxed_slice(),
        })
    }

    /// Builds a block from exactly `BLOCK_WORDS` words.
    pub fn from_words(words: &[u64]) -> Result<BitBlock> {
        verify_arg!(words, words.len() == BLOCK_WORDS);
        let mut block = Self::empty()?;
        block.words.copy_from_slice(words);
        Ok(block)
    }

    /// Builds a block with the bits of every range set.
    pub fn from_ranges(ranges: impl Iterator<Item = Range<u32>>) -> Result<BitBlock> {
        let mut block = Self::empty()?;
        for range in ranges {
            block.set_range(range);
        }
        Ok(block)
    }

    pub fn try_clone(&self) -> Result<BitBlock> {
        Self::from_words(&self.words)
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    #[inline]
    fn bit_position(offset: u32) -> (usize, u32) {
        ((offset / 64) as usize, offset % 64)
    }

    #[inline]
    pub fn contains(&self, offset: u16) -> bool {
        let (word, bit) = Self::bit_position(offset as u32);
        (self.words[word] >> bit) & 1 != 0
    }

    /// Sets the bit to `value`, returns whether it changed.
    #[inline]
    pub fn set_value(&mut self, offset: u16, value: bool) -> bool {
        let (word, bit) = Self::bit_position(offset as u32);
        let mask = 1u64 << bit;
        let prev = self.words[word];
        if value {
            self.words[word] = prev | mask;
        } else {
            self.words[word] = prev & !mask;
        }
        (prev & mask != 0) != value
    }

    /// Flips the bit, returns its new value.
    #[inline]
    pub fn flip(&mut self, offset: u16) -> bool {
        let (word, bit) = Self::bit_position(offset as u32);
        self.words[word] ^= 1u64 << bit;
        (self.words[word] >> bit) & 1 != 0
    }

    pub fn set_range(&mut self, range: Range<u32>) {
        self.process_range(range, |w, mask| *w |= mask);
    }

    pub fn reset_range(&mut self, range: Range<u32>) {
        self.process_range(range, |w, mask| *w &= !mask);
    }

    pub fn flip_range(&mut self, range: Range<u32>) {
        self.process_range(range, |w, mask| *w ^= mask);
    }

    pub fn set_range_value(&mut self, range: Range<u32>, value: bool) {
        if value {
            self.set_range(range);
        } else {
            self.reset_range(range);
        }
    }

    /// Applies `mask_fn(word, mask)` to every word overlapping `range`,
    /// where `mask` selects the bits of the word that fall in the range.
    pub fn process_range(&mut self, range: Range<u32>, mask_fn: impl Fn(&mut u64, u64)) {
        for (word, mask) in word_masks(range) {
            mask_fn(&mut self.words[word], mask);
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    pub fn negate(&mut self) {
        self.words.iter_mut().for_each(|w| *w = !*w);
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn count_range(&self, range: Range<u32>) -> u32 {
        word_masks(range)
            .map(|(word, mask)| (self.words[word] & mask).count_ones())
            .sum()
    }

    /// Number of maximal runs of ones.
    pub fn count_runs(&self) -> usize {
        // A run starts at bit `i` when bit `i` is set and bit `i - 1` is not.
        let mut runs = 0usize;
        let mut prev = 0u64;
        for &word in self.words.iter() {
            let starts = word & !((word << 1) | (prev >> 63));
            runs += starts.count_ones() as usize;
            prev = word;
        }
        runs
    }

    pub fn is_all_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_all_ones(&self) -> bool {
        self.words.iter().all(|&w| w == u64::MAX)
    }

    /// First set bit at or after `from`.
    pub fn find_next(&self, from: u32) -> Option<u16> {
        self.scan(from, 0)
    }

    /// First clear bit at or after `from`, or `BLOCK_BITS` when there is none.
    pub fn find_next_zero(&self, from: u32) -> u32 {
        self.scan(from, u64::MAX)
            .map(|offset| offset as u32)
            .unwrap_or(BLOCK_BITS)
    }

    /// Finds the first bit at or after `from` whose value differs from the
    /// bits of `background`.
    fn scan(&self, from: u32, background: u64) -> Option<u16> {
        if from >= BLOCK_BITS {
            return None;
        }
        let (mut w, bit) = Self::bit_position(from);
        let mut word = (self.words[w] ^ background) & (u64::MAX << bit);
        loop {
            if word != 0 {
                return Some((w * 64 + word.trailing_zeros() as usize) as u16);
            }
            w += 1;
            if w == BLOCK_WORDS {
                return None;
            }
            word = self.words[w] ^ background;
        }
    }

    /// Lowest offset at which the two blocks differ.
    pub fn first_difference(&self, other: &BitBlock) -> Option<u16> {
        self.words
            .iter()
            .zip(other.words.iter())
            .position(|(a, b)| a != b)
            .map(|w| {
                let diff = self.words[w] ^ other.words[w];
                (w * 64 + diff.trailing_zeros() as usize) as u16
            })
    }

    pub fn and_with(&mut self, other: &BitBlock) {
        self.zip_words(other, |a, b| a & b);
    }

    pub fn or_with(&mut self, other: &BitBlock) {
        self.zip_words(other, |a, b| a | b);
    }

    pub fn xor_with(&mut self, other: &BitBlock) {
        self.zip_words(other, |a, b| a ^ b);
    }

    pub fn sub_with(&mut self, other: &BitBlock) {
        self.zip_words(other, |a, b| a & !b);
    }

    #[inline]
    fn zip_words(&mut self, other: &BitBlock, op: impl Fn(u64, u64) -> u64) {
        self.words
            .iter_mut()
            .zip(other.words.iter())
            .for_each(|(a, &b)| *a = op(*a, b));
    }

    /// Offsets of the set bits, ascending.
    pub fn positions(&self) -> BitPositions<'_> {
        BitPositions {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Maximal runs of ones as half-open ranges, ascending.
    pub fn runs(&self) -> BitRuns<'_> {
        BitRuns {
            block: self,
            pos: 0,
        }
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

impl std::fmt::Debug for BitBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitBlock")
            .field("count", &self.count_ones())
            .field("runs", &self.count_runs())
            .finish()
    }
}

/// `(word index, mask)` pairs covering a half-open bit range.
fn word_masks(range: Range<u32>) -> impl Iterator<Item = (usize, u64)> {
    let start = range.start as usize;
    let end = range.end as usize;
    debug_assert!(end <= BLOCK_BITS as usize);
    let first_word = start / 64;
    let last_word = end.saturating_sub(1) / 64;
    let words = if start < end {
        first_word..last_word + 1
    } else {
        0..0
    };
    words.map(move |w| {
        let lo = if w == first_word { start % 64 } else { 0 };
        let hi = if w == last_word { (end - 1) % 64 + 1 } else { 64 };
        let width = hi - lo;
        let mask = if width == 64 {
            u64::MAX
        } else {
            ((1u64 << width) - 1) << lo
        };
        (w, mask)
    })
}

pub struct BitPositions<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for BitPositions<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.current == 0 {
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
        let bit = self.current.trailing_zeros();
        self.current &= self.current - 1;
        Some(self.word_idx as u32 * 64 + bit)
    }
}

pub struct BitRuns<'a> {
    block: &'a BitBlock,
    pos: u32,
}

impl Iterator for BitRuns<'_> {
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Range<u32>> {
        let start = self.block.find_next(self.pos)? as u32;
        let end = self.block.find_next_zero(start);
        self.pos = end;
        Some(start..end)
    }
}
