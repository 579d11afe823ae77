use std::{iter::Peekable, ops::Range};

/// Creates an iterator that yields the set-union of two ordered, non-overlapping
/// streams of `Range<T>`.
///
/// Each input must yield ranges in ascending order by `start` that do not
/// overlap within the same input (adjacency is allowed).
///
/// The output is ascending and non-overlapping. Overlapping or adjacent
/// (`next.start <= cur.end`) ranges from either side are merged, so the
/// output never contains two touching ranges.
///
/// O(len(a) + len(b)) comparisons, constant extra memory.
pub fn union_ranges<T, L, R>(a: L, b: R) -> UnionRanges<L::IntoIter, R::IntoIter, T>
where
    T: Ord + Clone,
    L: IntoIterator<Item = Range<T>>,
    R: IntoIterator<Item = Range<T>>,
{
    UnionRanges::new(a.into_iter(), b.into_iter())
}

/// Iterator adapter implementing [`union_ranges`].
pub struct UnionRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
{
    a: Peekable<I>,
    b: Peekable<J>,
    _marker: std::marker::PhantomData<T>,
}

impl<I, J, T> UnionRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
{
    pub fn new(a: I, b: J) -> Self {
        Self {
            a: a.peekable(),
            b: b.peekable(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<I, J, T> Iterator for UnionRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
    T: Ord + Clone,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let take_a = match (self.a.peek(), self.b.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(ra), Some(rb)) => ra.start <= rb.start,
        };
        let mut cur = if take_a { self.a.next()? } else { self.b.next()? };

        // Absorb everything from either side that touches the current range.
        loop {
            if let Some(r) = self.a.next_if(|r| r.start <= cur.end) {
                if r.end > cur.end {
                    cur.end = r.end;
                }
                continue;
            }
            if let Some(r) = self.b.next_if(|r| r.start <= cur.end) {
                if r.end > cur.end {
                    cur.end = r.end;
                }
                continue;
            }
            break;
        }

        Some(cur)
    }
}

#[cfg(test)]
#[allow(clippy::single_range_in_vec_init)]
mod tests {
    use super::union_ranges;
    use std::ops::Range;

    fn collect(a: Vec<Range<u32>>, b: Vec<Range<u32>>) -> Vec<Range<u32>> {
        union_ranges(a, b).collect()
    }

    #[test]
    fn empty_inputs() {
        assert!(collect(vec![], vec![]).is_empty());
        assert_eq!(collect(vec![1..4], vec![]), vec![1..4]);
        assert_eq!(collect(vec![], vec![1..4]), vec![1..4]);
    }

    #[test]
    fn disjoint_interleaved() {
        assert_eq!(
            collect(vec![0..2, 10..12], vec![5..7, 20..21]),
            vec![0..2, 5..7, 10..12, 20..21]
        );
    }

    #[test]
    fn adjacent_merged() {
        assert_eq!(collect(vec![0..5], vec![5..9]), vec![0..9]);
        assert_eq!(collect(vec![0..5, 9..12], vec![5..9]), vec![0..12]);
    }

    #[test]
    fn adjacent_within_one_side_merged() {
        assert_eq!(collect(vec![0..5, 5..8], vec![]), vec![0..8]);
    }

    #[test]
    fn chain_of_overlaps() {
        assert_eq!(
            collect(vec![0..4, 6..10, 12..20], vec![3..7, 9..13]),
            vec![0..20]
        );
    }

    #[test]
    fn containment() {
        assert_eq!(collect(vec![0..100], vec![5..6, 50..60]), vec![0..100]);
    }
}
