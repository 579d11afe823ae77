//! Error and result definitions shared by the blockbits crates.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind, StatusCode};
pub use result::Result;
