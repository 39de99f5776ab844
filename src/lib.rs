//! # Consensus-Codec
//!
//! Byte-exact wire codec and structural grammar for blockchain primitives.
//!
//! This crate decodes and encodes blocks, headers, transactions, inputs,
//! outputs, outpoints and script operations to the layout shared by the
//! peer-to-peer network, derives merkle roots, and classifies scripts into
//! the standard payment templates.
//!
//! ## Architecture
//!
//! Data flows bottom-up:
//! - Byte reader/writer ([`serialize`])
//! - OutPoint and its byte cursor ([`point`])
//! - Operations and templates ([`script`])
//! - Inputs and outputs ([`input`], [`output`])
//! - Transactions, headers and blocks ([`transaction`], [`header`], [`block`])
//!
//! ## Design Principles
//!
//! 1. **Byte Exactness**: `decode(encode(x)) == x` for every entity
//! 2. **No Partial State**: a failed `from_data` leaves the entity reset
//! 3. **Lenient Scripts**: malformed script bytes are captured, never rejected
//! 4. **Exact Version Pinning**: hash dependencies pinned to exact versions
//!
//! ## Usage
//!
//! ```rust
//! use consensus_codec::*;
//!
//! let block = Block::genesis_mainnet().unwrap();
//! assert_eq!(block.transactions.len(), 1);
//! assert_eq!(block.merkle_root(), block.header.merkle());
//!
//! let output = &block.transactions[0].outputs[0];
//! assert_eq!(output.pattern(), ScriptPattern::PayPublicKey);
//! ```

pub mod block;
pub mod constants;
pub mod error;
pub mod hashing;
pub mod header;
pub mod input;
pub mod output;
pub mod point;
pub mod script;
pub mod serialize;
pub mod transaction;
pub mod types;

// Re-export commonly used types
pub use block::Block;
pub use constants::*;
pub use error::CodecError;
pub use hashing::{bitcoin_hash, decode_hash, encode_hash, hash160, sha256_hash};
pub use header::Header;
pub use input::Input;
pub use output::Output;
pub use point::{OutPoint, PointIterator};
pub use script::{ConditionalStack, Opcode, Operation, ParseMode, Script, ScriptPattern};
pub use serialize::{variable_uint_size, Reader, Serializable, Writer};
pub use transaction::Transaction;
pub use types::*;
