//! OutPoint: reference to a previously created transaction output
//!
//! OutPoint: 𝒪 = ℍ × ℕ₃₂, serialized as the 32-byte hash followed by the
//! 4-byte little-endian index (36 bytes, fixed).

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::Result;
use crate::hashing::encode_hash;
use crate::serialize::{Reader, Serializable, Writer};
use crate::types::Hash;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The coinbase marker: all-zero hash with index 0xFFFFFFFF
    pub fn null() -> Self {
        Self {
            hash: NULL_HASH,
            index: u32::MAX,
        }
    }

    /// is_null ⇔ index = 0xFFFFFFFF ∧ hash = 0³²
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX && self.hash == NULL_HASH
    }

    /// True unless both fields hold their zero default
    pub fn is_valid(&self) -> bool {
        self.index != 0 || self.hash != NULL_HASH
    }

    /// Stable 63-bit identity key for external indexing.
    ///
    /// The little-endian index overwrites the first four bytes of a copy of
    /// the hash; the first eight bytes of that copy are read as a
    /// little-endian integer and the top bit is cleared. This is not a
    /// cryptographic checksum, and persisted indexes depend on its exact
    /// value.
    pub fn checksum(&self) -> u64 {
        const DIVISOR: u64 = 1 << 63;

        let mut copy = self.hash;
        copy[..4].copy_from_slice(&self.index.to_le_bytes());
        let mut low = [0u8; 8];
        low.copy_from_slice(&copy[..8]);

        // x mod 2^n == x & (2^n - 1)
        u64::from_le_bytes(low) & (DIVISOR - 1)
    }

    /// Cursor over the 36 serialized bytes, positioned at the first byte
    pub fn iter(&self) -> PointIterator<'_> {
        PointIterator::new(self)
    }

    /// Cursor positioned one past the last serialized byte
    pub fn end(&self) -> PointIterator<'_> {
        PointIterator::with_offset(self, PointIterator::MAX_OFFSET)
    }
}

impl Serializable for OutPoint {
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();

        let result = (|| -> Result<()> {
            self.hash = source.read_hash()?;
            self.index = source.read_u32_le()?;
            Ok(())
        })();

        if result.is_err() {
            self.reset();
        }
        result
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        sink.write_hash(&self.hash);
        sink.write_u32_le(self.index);
    }

    fn serialized_size(&self) -> u64 {
        OUTPOINT_SIZE as u64
    }

    fn reset(&mut self) {
        self.hash = NULL_HASH;
        self.index = 0;
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\thash = {}\n\tindex = {}", encode_hash(&self.hash), self.index)
    }
}

impl<'a> IntoIterator for &'a OutPoint {
    type Item = u8;
    type IntoIter = PointIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bidirectional cursor over the serialized bytes of an [`OutPoint`].
///
/// Bytes are computed on demand from the referenced point; no buffer is
/// materialized. Dereferencing at or past offset 36 yields zero.
#[derive(Debug, Clone, Copy)]
pub struct PointIterator<'a> {
    point: &'a OutPoint,
    offset: u8,
}

impl<'a> PointIterator<'a> {
    pub const MAX_OFFSET: u8 = OUTPOINT_SIZE as u8;

    pub fn new(point: &'a OutPoint) -> Self {
        Self { point, offset: 0 }
    }

    pub fn with_offset(point: &'a OutPoint, offset: u8) -> Self {
        Self { point, offset }
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// True while the cursor addresses a byte inside the serialization
    pub fn is_valid(&self) -> bool {
        self.offset < Self::MAX_OFFSET
    }

    /// Byte under the cursor
    pub fn get(&self) -> u8 {
        let offset = self.offset as usize;
        if offset < HASH_SIZE {
            return self.point.hash[offset];
        }

        let index_offset = offset - HASH_SIZE;
        if index_offset < 4 {
            return self.point.index.to_le_bytes()[index_offset];
        }

        0
    }

    /// Move forward one byte, saturating at the end position.
    pub fn increment(&mut self) {
        if self.offset < Self::MAX_OFFSET {
            self.offset += 1;
        }
    }

    /// Move back one byte, saturating at the start position.
    pub fn decrement(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
        }
    }
}

impl PartialEq for PointIterator<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.offset == other.offset
    }
}

impl Eq for PointIterator<'_> {}

impl Iterator for PointIterator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if !self.is_valid() {
            return None;
        }
        let byte = self.get();
        self.increment();
        Some(byte)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (Self::MAX_OFFSET - self.offset.min(Self::MAX_OFFSET)) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PointIterator<'_> {}
