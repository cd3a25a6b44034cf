//! Append-only binary writer.
//!
//! [`BinaryWriter`] appends little-endian fields to a `Vec<u8>` and supports
//! reserving an `i32` slot that is filled in once the size of what follows
//! is known.

use crate::INT_FIELD_SIZE;

/// A reserved `i32` slot in a [`BinaryWriter`]'s buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reserved slot must be patched"]
pub struct Placeholder {
    offset: usize,
}

impl Placeholder {
    /// Offset of the reserved slot in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// An append-only writer over a byte vector.
///
/// Writing never fails. Lengths and counts are encoded as `i32`; a span
/// longer than `i32::MAX` bytes cannot be represented.
///
/// # Example
///
/// ```
/// use docnode_common::BinaryWriter;
///
/// let mut buf = Vec::new();
/// let mut writer = BinaryWriter::new(&mut buf);
/// let start = writer.position();
/// let slot = writer.reserve_i32();
/// writer.write_lp_bytes(b"abc");
/// let written = writer.position() - start;
/// writer.patch_i32(slot, written as i32);
///
/// assert_eq!(buf, [11, 0, 0, 0, 3, 0, 0, 0, b'a', b'b', b'c']);
/// ```
#[derive(Debug)]
pub struct BinaryWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> BinaryWriter<'a> {
    /// Create a writer that appends to `buf`.
    #[inline]
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    /// Current length of the underlying buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a length or count field.
    ///
    /// # Panics
    ///
    /// Panics if `len` does not fit in an `i32`.
    #[inline]
    pub fn write_len(&mut self, len: usize) {
        self.write_i32(to_wire_len(len));
    }

    /// Write raw bytes without a prefix.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a length-prefixed byte string.
    ///
    /// Zero-length input writes only the prefix.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than `i32::MAX`.
    pub fn write_lp_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        if !bytes.is_empty() {
            self.write_bytes(bytes);
        }
    }

    /// Reserve an `i32` slot to be filled by [`patch_i32`](Self::patch_i32).
    pub fn reserve_i32(&mut self) -> Placeholder {
        let offset = self.buf.len();
        self.buf.extend_from_slice(&[0u8; INT_FIELD_SIZE]);
        Placeholder { offset }
    }

    /// Overwrite a previously reserved slot.
    pub fn patch_i32(&mut self, slot: Placeholder, value: i32) {
        self.buf[slot.offset..slot.offset + INT_FIELD_SIZE].copy_from_slice(&value.to_le_bytes());
    }

    /// Patch `slot` with the number of bytes written since `start`.
    ///
    /// # Panics
    ///
    /// Panics if that span does not fit in an `i32`.
    pub fn patch_len_since(&mut self, slot: Placeholder, start: usize) {
        let len = to_wire_len(self.buf.len() - start);
        self.patch_i32(slot, len);
    }
}

fn to_wire_len(len: usize) -> i32 {
    match i32::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("length {len} exceeds the i32 wire limit"),
    }
}
