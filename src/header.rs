//! Block header: 80-byte fixed body with a lazily cached content hash
//!
//! Header: ℋ = ℕ₃₂ × ℍ × ℍ × ℕ₃₂ × ℕ₃₂ × ℕ₃₂, optionally followed on the
//! wire by a var-int transaction count.
//!
//! Fields that feed the hash are only reachable through setters, so the
//! cache can never disagree with the body it was computed from.

use std::fmt;
use std::io::Read;
use std::sync::OnceLock;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::constants::{HEADER_SIZE, NULL_HASH};
use crate::error::Result;
use crate::hashing::{bitcoin_hash, encode_hash};
use crate::serialize::{variable_uint_size, Reader, Serializable, Writer};
use crate::types::{ByteString, Hash};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    version: u32,
    previous_block_hash: Hash,
    merkle: Hash,
    timestamp: u32,
    bits: u32,
    nonce: u32,
    transaction_count: u64,
    /// Single-assignment cell: readers see nothing or the finished digest
    #[serde(skip)]
    hash_cache: OnceLock<Hash>,
}

impl Header {
    pub fn new(
        version: u32,
        previous_block_hash: Hash,
        merkle: Hash,
        timestamp: u32,
        bits: u32,
        nonce: u32,
        transaction_count: u64,
    ) -> Self {
        Self {
            version,
            previous_block_hash,
            merkle,
            timestamp,
            bits,
            nonce,
            transaction_count,
            hash_cache: OnceLock::new(),
        }
    }

    pub fn satoshi_fixed_size_without_transaction_count() -> u64 {
        HEADER_SIZE as u64
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn previous_block_hash(&self) -> Hash {
        self.previous_block_hash
    }

    pub fn merkle(&self) -> Hash {
        self.merkle
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
        self.invalidate_hash();
    }

    pub fn set_previous_block_hash(&mut self, hash: Hash) {
        self.previous_block_hash = hash;
        self.invalidate_hash();
    }

    pub fn set_merkle(&mut self, merkle: Hash) {
        self.merkle = merkle;
        self.invalidate_hash();
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
        self.invalidate_hash();
    }

    pub fn set_bits(&mut self, bits: u32) {
        self.bits = bits;
        self.invalidate_hash();
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        self.nonce = nonce;
        self.invalidate_hash();
    }

    /// The count is not part of the hashed body.
    pub fn set_transaction_count(&mut self, transaction_count: u64) {
        self.transaction_count = transaction_count;
    }

    /// Double SHA-256 of the 80-byte body.
    ///
    /// Computed on first call and cached; concurrent callers block on the
    /// one computation rather than repeating it.
    pub fn hash(&self) -> Hash {
        *self.hash_cache.get_or_init(|| {
            let hash = bitcoin_hash(&self.to_data_with(false));
            #[cfg(test)]
            tests::HASH_COMPUTATIONS.with(|count| count.set(count.get() + 1));
            trace!("computed header hash {}", encode_hash(&hash));
            hash
        })
    }

    pub fn is_hash_cached(&self) -> bool {
        self.hash_cache.get().is_some()
    }

    fn invalidate_hash(&mut self) {
        self.hash_cache.take();
    }

    /// Any field of the 80-byte body is non-zero. The count is not checked.
    pub fn is_valid(&self) -> bool {
        self.version != 0
            || self.previous_block_hash != NULL_HASH
            || self.merkle != NULL_HASH
            || self.timestamp != 0
            || self.bits != 0
            || self.nonce != 0
    }

    pub fn from_data_with<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        with_transaction_count: bool,
    ) -> Result<()> {
        self.reset();
        let result = self.deserialize(source, with_transaction_count);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn deserialize<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        with_transaction_count: bool,
    ) -> Result<()> {
        self.version = source.read_u32_le()?;
        self.previous_block_hash = source.read_hash()?;
        self.merkle = source.read_hash()?;
        self.timestamp = source.read_u32_le()?;
        self.bits = source.read_u32_le()?;
        self.nonce = source.read_u32_le()?;

        if with_transaction_count {
            self.transaction_count = source.read_var_int()?;
        }

        Ok(())
    }

    pub fn to_writer_with<W: Writer + ?Sized>(&self, sink: &mut W, with_transaction_count: bool) {
        sink.write_u32_le(self.version);
        sink.write_hash(&self.previous_block_hash);
        sink.write_hash(&self.merkle);
        sink.write_u32_le(self.timestamp);
        sink.write_u32_le(self.bits);
        sink.write_u32_le(self.nonce);

        if with_transaction_count {
            sink.write_var_int(self.transaction_count);
        }
    }

    pub fn to_data_with(&self, with_transaction_count: bool) -> ByteString {
        let mut data =
            Vec::with_capacity(self.serialized_size_with(with_transaction_count) as usize);
        self.to_writer_with(&mut data, with_transaction_count);
        data
    }

    pub fn serialized_size_with(&self, with_transaction_count: bool) -> u64 {
        let size = Self::satoshi_fixed_size_without_transaction_count();
        if with_transaction_count {
            size + variable_uint_size(self.transaction_count)
        } else {
            size
        }
    }
}

impl Serializable for Header {
    /// Includes the trailing transaction count
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.from_data_with(source, true)
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        self.to_writer_with(sink, true);
    }

    fn serialized_size(&self) -> u64 {
        self.serialized_size_with(true)
    }

    fn reset(&mut self) {
        self.version = 0;
        self.previous_block_hash = NULL_HASH;
        self.merkle = NULL_HASH;
        self.timestamp = 0;
        self.bits = 0;
        self.nonce = 0;
        self.transaction_count = 0;
        self.invalidate_hash();
    }
}

/// Field equality; the cache does not participate.
impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.previous_block_hash == other.previous_block_hash
            && self.merkle == other.merkle
            && self.timestamp == other.timestamp
            && self.bits == other.bits
            && self.nonce == other.nonce
            && self.transaction_count == other.transaction_count
    }
}

impl Eq for Header {}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Header {}", encode_hash(&self.hash()))?;
        writeln!(f, "\tversion = {}", self.version)?;
        writeln!(f, "\tprevious_block_hash = {}", encode_hash(&self.previous_block_hash))?;
        writeln!(f, "\tmerkle = {}", encode_hash(&self.merkle))?;
        writeln!(f, "\ttimestamp = {}", self.timestamp)?;
        writeln!(f, "\tbits = {:#010x}", self.bits)?;
        writeln!(f, "\tnonce = {}", self.nonce)?;
        write!(f, "\ttransaction_count = {}", self.transaction_count)
    }
}
