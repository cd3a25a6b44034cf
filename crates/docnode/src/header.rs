//! Packed node header.

use docnode_common::{BinaryReader, INT_FIELD_SIZE};
use tracing::debug;
use zerocopy::byteorder::little_endian::I32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, NodeType, Result};

/// The only supported format version.
pub const VERSION: u8 = 1;

/// Fixed leading fields of every encoded node.
///
/// The layout is `version:u8 total_len:i32 type:i32`, little-endian and
/// unaligned. `total_len` covers the whole node from the version byte through
/// the end of its last descendant.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct NodeHeader {
    version: u8,
    total_len: I32,
    node_type: I32,
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Size of the version byte plus the length field.
    pub const PREFIX_LEN: usize = 1 + INT_FIELD_SIZE;

    /// Smallest possible encoded node: header, empty data, no attributes,
    /// empty child list.
    pub const MIN_NODE_LEN: usize = Self::SIZE + 3 * INT_FIELD_SIZE;

    /// Read and validate the header at the start of `data` without touching
    /// the node body.
    ///
    /// Applies the same gates as a full decode: the buffer must hold the
    /// header prefix, the version must be [`VERSION`], and the declared length
    /// must be plausible and fit inside `data`.
    pub fn peek(data: &[u8]) -> Result<Self> {
        if data.len() < Self::PREFIX_LEN {
            debug!(available = data.len(), "buffer too short for node header");
            return Err(Error::HeaderTooShort {
                available: data.len(),
            });
        }

        if data[0] != VERSION {
            debug!(found = data[0], expected = VERSION, "unsupported node version");
            return Err(Error::VersionMismatch {
                found: data[0],
                expected: VERSION,
            });
        }

        let declared = i32::from_le_bytes([data[1], data[2], data[3], data[4]]);
        let total_len = match usize::try_from(declared) {
            Ok(len) if len >= Self::MIN_NODE_LEN => len,
            _ => {
                debug!(declared, "invalid node length");
                return Err(Error::InvalidNodeLength(declared));
            }
        };
        if total_len > data.len() {
            debug!(declared = total_len, available = data.len(), "node overruns buffer");
            return Err(Error::SizeOverflow {
                declared: total_len,
                available: data.len(),
            });
        }

        let mut reader = BinaryReader::new(data);
        Ok(reader.read_struct()?)
    }

    /// Version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Declared total node length in bytes.
    ///
    /// Only meaningful for headers returned by [`peek`](Self::peek), which
    /// rejects negative lengths.
    pub fn total_len(&self) -> usize {
        usize::try_from(self.total_len.get()).unwrap_or(0)
    }

    /// Node type tag.
    pub fn node_type(&self) -> NodeType {
        NodeType::from_raw(self.node_type.get())
    }
}
