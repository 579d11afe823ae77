use std::ops::Range;

/// Creates an iterator over the symmetric difference of two ascending,
/// non-overlapping range streams: positions covered by exactly one side.
///
/// Output ranges are ascending and non-overlapping but may be adjacent
/// (e.g. `0..5` xor `5..8` yields `0..5, 5..8`). Coalesce them if a
/// canonical form is needed.
pub fn symmetric_difference_ranges<T, L, R>(
    a: L,
    b: R,
) -> SymmetricDifferenceRanges<L::IntoIter, R::IntoIter, T>
where
    T: Ord + Clone,
    L: IntoIterator<Item = Range<T>>,
    R: IntoIterator<Item = Range<T>>,
{
    SymmetricDifferenceRanges::new(a.into_iter(), b.into_iter())
}

/// Iterator adapter implementing [`symmetric_difference_ranges`].
pub struct SymmetricDifferenceRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
{
    a: I,
    b: J,
    cur_a: Option<Range<T>>,
    cur_b: Option<Range<T>>,
}

impl<I, J, T> SymmetricDifferenceRanges<I, J, T>
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

impl<I, J, T> Iterator for SymmetricDifferenceRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
    T: Ord + Clone,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ra) = &self.cur_a {
                if ra.start >= ra.end {
                    self.cur_a = self.a.next();
                    continue;
                }
            }
            if let Some(rb) = &self.cur_b {
                if rb.start >= rb.end {
                    self.cur_b = self.b.next();
                    continue;
                }
            }

            let (ra, rb) = match (&mut self.cur_a, &mut self.cur_b) {
                (None, None) => return None,
                (Some(ra), None) => {
                    let out = ra.clone();
                    self.cur_a = self.a.next();
                    return Some(out);
                }
                (None, Some(rb)) => {
                    let out = rb.clone();
                    self.cur_b = self.b.next();
                    return Some(out);
                }
                (Some(ra), Some(rb)) => (ra, rb),
            };

            if ra.end <= rb.start {
                let out = ra.clone();
                self.cur_a = self.a.next();
                return Some(out);
            }
            if rb.end <= ra.start {
                let out = rb.clone();
                self.cur_b = self.b.next();
                return Some(out);
            }

            // Overlap. Emit the uncovered head of whichever starts first.
            if ra.start < rb.start {
                let out = ra.start.clone()..rb.start.clone();
                ra.start = rb.start.clone();
                return Some(out);
            }
            if rb.start < ra.start {
                let out = rb.start.clone()..ra.start.clone();
                rb.start = ra.start.clone();
                return Some(out);
            }

            // Same start: drop the common part from both.
            let common_end = std::cmp::min(&ra.end, &rb.end).clone();
            ra.start = common_end.clone();
            rb.start = common_end;
        }
    }
}
