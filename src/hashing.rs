//! Content-hash primitives used for identifiers and merkle trees

use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{CodecError, Result};
use crate::types::{Hash, ShortHash};

/// Double SHA-256: SHA256(SHA256(x))
pub fn bitcoin_hash(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).into_inner()
}

/// Single SHA-256
pub fn sha256_hash(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(data));
    hash
}

/// HASH160: RIPEMD160(SHA256(x))
pub fn hash160(data: &[u8]) -> ShortHash {
    let sha256 = Sha256::digest(data);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&Ripemd160::digest(sha256));
    hash
}

/// Hex display of a digest in reversed byte order, as identifiers are shown
pub fn encode_hash(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Inverse of [`encode_hash`]
pub fn decode_hash(encoded: &str) -> Result<Hash> {
    let bytes = hex::decode(encoded)?;
    if bytes.len() != 32 {
        return Err(CodecError::Hex(hex::FromHexError::InvalidStringLength));
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Ok(hash)
}
