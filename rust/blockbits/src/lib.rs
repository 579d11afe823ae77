//! Mutable bit vectors over a 32-bit index space.
//!
//! A [`BitVector`] splits its index space into blocks of
//! [`block::BLOCK_BITS`] bits, kept in a sparse two-level
//! [`directory::BlockDirectory`]. A block is absent (all zeros), a raw bit
//! array, a run-length "GAP" list, or a storage-free full sentinel. The
//! representation never affects results; [`BitVector::optimize`] re-picks
//! the smallest one.
//!
//! Vectors combine in place with AND, OR, SUB and XOR
//! ([`BitVector::combine`]) and round-trip through a checksummed binary
//! BLOB ([`BitVector::serialize`], [`BitVector::deserialize`]).

pub mod block;
pub mod bvector;
pub mod combine;
pub mod config;
pub mod directory;
pub mod engine;
mod mutation;
pub mod optimize;
pub mod query;
pub mod serialize;
#[cfg(test)]
mod tests;

pub use blockbits_common::{Error, ErrorKind, Result, StatusCode};
pub use bvector::BitVector;
pub use combine::CombineOp;
pub use config::{BitVectorConfig, Strategy};
pub use engine::Engine;
pub use optimize::{OptimizeMode, Statistics};
pub use query::Positions;
