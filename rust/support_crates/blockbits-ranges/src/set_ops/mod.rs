mod complement;
mod difference;
mod intersection;
mod symmetric_difference;
mod union;

pub use complement::{ComplementRanges, complement_ranges};
pub use difference::{DifferenceRanges, difference_ranges};
pub use intersection::{IntersectionRanges, intersect_ranges};
pub use symmetric_difference::{SymmetricDifferenceRanges, symmetric_difference_ranges};
pub use union::{UnionRanges, union_ranges};
