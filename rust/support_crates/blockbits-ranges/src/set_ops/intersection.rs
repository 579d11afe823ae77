use std::ops::Range;

/// Creates an iterator that yields the set-intersection of two ordered,
/// non-overlapping streams of `Range<T>`.
///
/// Output ranges are ascending, non-empty and non-overlapping. They may be
/// adjacent when the inputs are adjacent within one side.
pub fn intersect_ranges<T, L, R>(a: L, b: R) -> IntersectionRanges<L::IntoIter, R::IntoIter, T>
where
    T: Ord + Clone,
    L: IntoIterator<Item = Range<T>>,
    R: IntoIterator<Item = Range<T>>,
{
    IntersectionRanges::new(a.into_iter(), b.into_iter())
}

/// Iterator adapter implementing [`intersect_ranges`].
pub struct IntersectionRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
{
    a: I,
    b: J,
    cur_a: Option<Range<T>>,
    cur_b: Option<Range<T>>,
}

impl<I, J, T> IntersectionRanges<I, J, T>
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

impl<I, J, T> Iterator for IntersectionRanges<I, J, T>
where
    I: Iterator<Item = Range<T>>,
    J: Iterator<Item = Range<T>>,
    T: Ord + Clone,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (ra, rb) = match (&self.cur_a, &self.cur_b) {
                (Some(a), Some(b)) => (a, b),
                _ => return None,
            };

            if ra.end <= rb.start {
                self.cur_a = self.a.next();
                continue;
            }
            if rb.end <= ra.start {
                self.cur_b = self.b.next();
                continue;
            }

            let start = std::cmp::max(&ra.start, &rb.start).clone();
            let end = std::cmp::min(&ra.end, &rb.end).clone();
            let a_done = ra.end <= rb.end;
            let b_done = rb.end <= ra.end;
            if a_done {
                self.cur_a = self.a.next();
            }
            if b_done {
                self.cur_b = self.b.next();
            }

            if start < end {
                return Some(start..end);
            }
        }
    }
}
