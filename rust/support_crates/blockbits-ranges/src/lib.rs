//! Streaming set algebra over ordered `Range<T>` streams.
//!
//! Every operator takes inputs that yield non-overlapping ranges in
//! ascending order and produces output with the same property, holding
//! only constant look-ahead. Used by run-length encoded bit blocks to
//! combine their runs without materializing bits.

pub mod set_ops;

pub use set_ops::{
    complement_ranges, difference_ranges, intersect_ranges, symmetric_difference_ranges,
    union_ranges,
};
