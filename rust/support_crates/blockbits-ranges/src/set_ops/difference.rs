use std::ops::Range;

/// Creates an iterator over `a \ b`: the parts of ranges in `a` not covered
/// by any range in `b`. Both inputs must be ascending and non-overlapping.
pub fn difference_ranges<T, L, R>(a: L, b: R) -> DifferenceRanges<L::IntoIter, R::IntoIter, T>
where
    T: Ord + Clone,
    L: IntoIterator<Item = Range<T>>,
    R: IntoIterator<Item = Range<T>>,
{
    DifferenceRanges::new(a.into_iter(), b.into_iter())
}

/// Iterator adapter implementing [`difference_ranges`].
pub struct DifferenceRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
{
    a: I,
    b: J,
    cur_a: Option<Range<T>>,
    cur_b: Option<Range<T>>,
}

impl<I, J, T> DifferenceRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
    T: Ord + Clone,
{
    pub fn new(mut a: I, mut b: J) -> Self {
        let cur_a = a.next();
        let cur_b = b.next();
        Self { a, b, cur_a, cur_b }
    }
}

impl<I, J, T> Iterator for DifferenceRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
    T: Ord + Clone,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ra = self.cur_a.as_mut()?;
            if ra.start >= ra.end {
                self.cur_a = self.a.next();
                continue;
            }

            let Some(rb) = &self.cur_b else {
                let out = ra.clone();
                self.cur_a = self.a.next();
                return Some(out);
            };

            if rb.end <= ra.start {
                self.cur_b = self.b.next();
                continue;
            }
            if ra.end <= rb.start {
                let out = ra.clone();
                self.cur_a = self.a.next();
                return Some(out);
            }

            if ra.start < rb.start {
                // Head of `a` before `b` begins.
                let out = ra.start.clone()..rb.start.clone();
                ra.start = rb.start.clone();
                return Some(out);
            }

            // `b` covers the head of `a`: cut it off.
            ra.start = std::cmp::min(&rb.end, &ra.end).clone();
        }
    }
}

#[cfg(test)]
#[allow(clippy::single_range_in_vec_init)]
mod tests {
    use super::difference_ranges;
    use std::ops::Range;

    fn collect(a: Vec<Range<u32>>, b: Vec<Range<u32>>) -> Vec<Range<u32>> {
        difference_ranges(a, b).collect()
    }

    #[test]
    fn empty_inputs() {
        assert!(collect(vec![], vec![0..4]).is_empty());
        assert_eq!(collect(vec![0..4], vec![]), vec![0..4]);
    }

    #[test]
    fn hole_in_middle() {
        assert_eq!(collect(vec![0..10], vec![3..5]), vec![0..3, 5..10]);
    }

    #[test]
    fn cut_edges() {
        assert_eq!(collect(vec![0..10], vec![0..2, 8..12]), vec![2..8]);
        assert!(collect(vec![2..4], vec![0..10]).is_empty());
    }

    #[test]
    fn many_holes_across_ranges() {
        assert_eq!(
            collect(vec![0..10, 20..30], vec![1..2, 5..22, 25..26]),
            vec![0..1, 2..5, 22..25, 26..30]
        );
    }

    #[test]
    fn disjoint_untouched() {
        assert_eq!(collect(vec![0..2, 6..8], vec![3..5]), vec![0..2, 6..8]);
    }
}
