//! Common binary primitives for docnode.
//!
//! This crate provides the low-level building blocks shared by the node codec:
//!
//! - [`BinaryReader`] - Zero-copy, bounds-checked reading from byte slices
//! - [`BinaryWriter`] - Append-only writing with patchable length placeholders
//! - Length-prefixed byte strings (`len:i32` followed by `len` bytes)
//!
//! All multi-byte integers are little-endian, independent of the host.

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::{BinaryWriter, Placeholder};

/// Size in bytes of every length, count and type field on the wire.
pub const INT_FIELD_SIZE: usize = std::mem::size_of::<i32>();
