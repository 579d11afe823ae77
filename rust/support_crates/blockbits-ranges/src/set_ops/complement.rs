use std::{iter::Peekable, ops::Range};

/// Creates an iterator over the gaps of `ranges` within `[0, size)`.
///
/// `ranges` must be ascending; overlapping, adjacent or empty input ranges
/// are tolerated, and anything at or beyond `size` is ignored. Output ranges
/// are ascending, non-empty and never adjacent.
pub fn complement_ranges<T, I>(size: T, ranges: I) -> ComplementRanges<I::IntoIter, T>
where
    T: Ord + Clone + Default,
    I: IntoIterator<Item = Range<T>>,
{
    ComplementRanges::new(size, ranges.into_iter())
}

/// Iterator adapter implementing [`complement_ranges`].
pub struct ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
{
    it: Peekable<I>,
    size: T,
    cursor: T,
}

impl<I, T> ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
    T: Ord + Clone + Default,
{
    pub fn new(size: T, it: I) -> Self {
        Self {
            it: it.peekable(),
            size,
            cursor: T::default(),
        }
    }
}

impl<I, T> Iterator for ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
    T: Ord + Clone + Default,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor >= self.size {
                return None;
            }

            let Some(r) = self.it.peek() else {
                let start = std::mem::replace(&mut self.cursor, self.size.clone());
                return Some(start..self.size.clone());
            };

            if r.start >= r.end || r.end <= self.cursor {
                self.it.next();
                continue;
            }

            if r.start > self.cursor {
                let gap_end = std::cmp::min(&r.start, &self.size).clone();
                let start = std::mem::replace(&mut self.cursor, gap_end.clone());
                return Some(start..gap_end);
            }

            // Covered: move the cursor past this range.
            self.cursor = std::cmp::min(&r.end, &self.size).clone();
            self.it.next();
        }
    }
}
