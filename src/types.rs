//! Core value types shared by every wire entity

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Short hash type: 160-bit digest (HASH160 output)
pub type ShortHash = [u8; 20];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Ordered list of digests, e.g. merkle leaves
pub type HashList = Vec<Hash>;
