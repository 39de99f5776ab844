//! Wire-format constants, opcode boundaries and reference genesis vectors

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::Result;
use crate::types::Hash;

/// Size of a full digest in bytes
pub const HASH_SIZE: usize = 32;

/// Size of a HASH160 digest in bytes
pub const SHORT_HASH_SIZE: usize = 20;

/// The all-zero digest
pub const NULL_HASH: Hash = [0u8; HASH_SIZE];

/// Serialized outpoint: hash followed by a 4-byte index
pub const OUTPOINT_SIZE: usize = HASH_SIZE + 4;

/// Serialized header body, excluding the optional transaction count
pub const HEADER_SIZE: usize = 80;

/// Sequence number marking an input as final
pub const MAX_INPUT_SEQUENCE: u32 = u32::MAX;

/// Lock time threshold: values below are block heights, above are timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Largest payload carried by a standard OP_RETURN output
pub const MAX_NULL_DATA_SIZE: usize = 80;

/// Largest payload of a direct push; the opcode byte is the length
pub const MAX_SPECIAL_PUSH_SIZE: usize = 75;

/// Opcode byte values bounding the small-integer range
pub const OP_1_BYTE: u8 = 0x51;
pub const OP_16_BYTE: u8 = 0x60;

/// Maximum number of keys in a standard multisig output
pub const MAX_MULTISIG_KEYS: usize = (OP_16_BYTE - OP_1_BYTE + 1) as usize;

/// Mainnet genesis block, hex encoded
pub const ENCODED_MAINNET_GENESIS_BLOCK: &str = concat!(
    "01000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
    "29ab5f49",
    "ffff001d",
    "1dac2b7c",
    "01",
    "01000000",
    "01",
    "0000000000000000000000000000000000000000000000000000000000000000ffffffff",
    "4d",
    "04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73",
    "ffffffff",
    "01",
    "00f2052a01000000",
    "43",
    "4104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac",
    "00000000",
);

/// Testnet genesis block, hex encoded
pub const ENCODED_TESTNET_GENESIS_BLOCK: &str = concat!(
    "01000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
    "dae5494d",
    "ffff001d",
    "1aa4ae18",
    "01",
    "01000000",
    "01",
    "0000000000000000000000000000000000000000000000000000000000000000ffffffff",
    "4d",
    "04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73",
    "ffffffff",
    "01",
    "00f2052a01000000",
    "43",
    "4104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac",
    "00000000",
);

/// Chain selection for the embedded reference vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Hex encoding of this network's genesis block
    pub fn encoded_genesis_block(&self) -> &'static str {
        match self {
            Network::Mainnet => ENCODED_MAINNET_GENESIS_BLOCK,
            Network::Testnet => ENCODED_TESTNET_GENESIS_BLOCK,
        }
    }

    /// Decode and verify this network's genesis block
    pub fn genesis_block(&self) -> Result<Block> {
        match self {
            Network::Mainnet => Block::genesis_mainnet(),
            Network::Testnet => Block::genesis_testnet(),
        }
    }
}
