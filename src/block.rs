//! Block: header plus ordered transactions, and merkle root derivation

use std::fmt;
use std::io::Read;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{ENCODED_MAINNET_GENESIS_BLOCK, ENCODED_TESTNET_GENESIS_BLOCK, NULL_HASH};
use crate::error::{CodecError, Result};
use crate::hashing::{bitcoin_hash, encode_hash};
use crate::header::Header;
use crate::serialize::{variable_uint_size, Serializable, Writer};
use crate::transaction::Transaction;
use crate::types::{Hash, HashList};

/// Block: ℬ = ℋ × [𝒯𝒳]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Header transaction count is set from `transactions`.
    pub fn new(mut header: Header, transactions: Vec<Transaction>) -> Self {
        header.set_transaction_count(transactions.len() as u64);
        Self {
            header,
            transactions,
        }
    }

    /// is_valid ⇔ |txs| > 0 ∨ header.is_valid
    pub fn is_valid(&self) -> bool {
        !self.transactions.is_empty() || self.header.is_valid()
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Merkle root over this block's transaction hashes
    pub fn merkle_root(&self) -> Hash {
        Self::generate_merkle_root(&self.transactions)
    }

    pub fn generate_merkle_root(transactions: &[Transaction]) -> Hash {
        let hashes: HashList = transactions.iter().map(Transaction::hash).collect();
        Self::build_merkle_tree(hashes)
    }

    /// MerkleRoot: [ℍ] → ℍ
    ///
    /// 1. If there are no hashes: return the null hash
    /// 2. While more than one hash remains:
    ///    - If the count is odd, duplicate the last hash
    ///    - Replace each adjacent pair (l, r) with SHA256d(l ‖ r)
    /// 3. Return the remaining hash
    ///
    /// Duplication happens at every level. This lets distinct leaf lists
    /// share a root (CVE-2012-2459) and must not be changed.
    pub fn build_merkle_tree(mut hashes: HashList) -> Hash {
        if hashes.is_empty() {
            return NULL_HASH;
        }

        let mut len = hashes.len();
        let mut pair = [0u8; 64];

        while len > 1 {
            let mut write = 0;
            let mut read = 0;

            while read < len {
                let left = hashes[read];
                let right = if read + 1 < len { hashes[read + 1] } else { left };

                pair[..32].copy_from_slice(&left);
                pair[32..].copy_from_slice(&right);
                hashes[write] = bitcoin_hash(&pair);

                write += 1;
                read += 2;
            }

            len = write;
        }

        hashes[0]
    }

    pub fn genesis_mainnet() -> Result<Block> {
        Self::decode_genesis(ENCODED_MAINNET_GENESIS_BLOCK)
    }

    pub fn genesis_testnet() -> Result<Block> {
        Self::decode_genesis(ENCODED_TESTNET_GENESIS_BLOCK)
    }

    fn decode_genesis(encoded: &str) -> Result<Block> {
        let data = hex::decode(encoded)?;
        let block = Block::from_bytes(&data)?;

        // 1. Whole blob consumed
        if block.serialized_size() != data.len() as u64 {
            return Err(CodecError::InvalidBlock(format!(
                "genesis encoding has {} bytes, block uses {}",
                data.len(),
                block.serialized_size()
            )));
        }

        // 2. Exactly one transaction
        if !block.is_valid() || block.transactions.len() != 1 {
            return Err(CodecError::InvalidBlock(format!(
                "genesis block has {} transactions",
                block.transactions.len()
            )));
        }

        // 3. Merkle commitment matches
        let merkle = block.merkle_root();
        if merkle != block.header.merkle() {
            return Err(CodecError::InvalidBlock(format!(
                "genesis merkle root {} does not match header {}",
                encode_hash(&merkle),
                encode_hash(&block.header.merkle())
            )));
        }

        Ok(block)
    }

    fn deserialize<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.header.from_data_with(source, true)?;

        let count = self.header.transaction_count();
        for index in 0..count {
            let transaction = Transaction::factory_from_data(source).map_err(|err| {
                debug!("block transaction {} of {} failed: {}", index, count, err);
                err
            })?;
            self.transactions.push(transaction);
        }

        Ok(())
    }
}

impl Serializable for Block {
    /// All or nothing: any failing transaction resets the whole block.
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();
        let result = self.deserialize(source);
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// The count written is always the number of transactions held.
    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        self.header.to_writer_with(sink, false);
        sink.write_var_int(self.transactions.len() as u64);
        for transaction in &self.transactions {
            transaction.to_writer(sink);
        }
    }

    fn serialized_size(&self) -> u64 {
        let transactions: u64 = self
            .transactions
            .iter()
            .map(Transaction::serialized_size)
            .sum();

        self.header.serialized_size_with(false)
            + variable_uint_size(self.transactions.len() as u64)
            + transactions
    }

    fn reset(&mut self) {
        self.header.reset();
        self.transactions.clear();
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for transaction in &self.transactions {
            writeln!(f, "{}", transaction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::decode_hash;
    use crate::script::ScriptPattern;

    fn leaf(byte: u8) -> Hash {
        [byte; 32]
    }

    #[test]
    fn test_merkle_empty_is_null() {
        assert_eq!(Block::build_merkle_tree(Vec::new()), NULL_HASH);
        assert_eq!(Block::generate_merkle_root(&[]), NULL_HASH);
    }

    #[test]
    fn test_merkle_single_leaf_unchanged() {
        assert_eq!(Block::build_merkle_tree(vec![leaf(9)]), leaf(9));
    }

    #[test]
    fn test_merkle_pair() {
        assert_eq!(
            hex::encode(Block::build_merkle_tree(vec![leaf(1), leaf(2)])),
            "39ce20bede82c96b8908bec4a157b09c549b3db90b9b474bda9ae9b9030310b4"
        );
    }

    #[test]
    fn test_merkle_odd_duplicates_last() {
        let three = Block::build_merkle_tree(vec![leaf(1), leaf(2), leaf(3)]);
        assert_eq!(
            hex::encode(three),
            "223e023fadf1f053df26988871f893c821c28edf77d64a955e6c2a02d547bdac"
        );
        assert_eq!(
            three,
            Block::build_merkle_tree(vec![leaf(1), leaf(2), leaf(3), leaf(3)])
        );
    }

    #[test]
    fn test_merkle_duplicates_at_every_level() {
        let five = (1..=5).map(leaf).collect();
        assert_eq!(
            hex::encode(Block::build_merkle_tree(five)),
            "26e2870f72368b3f8baef83fa26282d95d9c194e1f33d90a12932e0f6022e5d3"
        );
    }

    #[test]
    fn test_genesis_mainnet() {
        let block = Block::genesis_mainnet().unwrap();
        assert!(block.is_valid());
        assert!(block.header.is_valid());
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.serialized_size(), 285);
        assert_eq!(block.merkle_root(), block.header.merkle());
        assert_eq!(
            block.hash(),
            decode_hash("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f").unwrap()
        );

        let coinbase = &block.transactions[0];
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.serialized_size(), 204);
        assert_eq!(coinbase.inputs[0].script.operations.len(), 1);
        assert_eq!(coinbase.outputs[0].value, 5_000_000_000);
        assert_eq!(coinbase.outputs[0].pattern(), ScriptPattern::PayPublicKey);
    }

    #[test]
    fn test_genesis_testnet() {
        let block = Block::genesis_testnet().unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(
            encode_hash(&block.hash()),
            "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943"
        );
        assert_eq!(
            block.merkle_root(),
            Block::genesis_mainnet().unwrap().merkle_root()
        );
    }

    #[test]
    fn test_genesis_round_trip() {
        let data = hex::decode(ENCODED_MAINNET_GENESIS_BLOCK).unwrap();
        let block = Block::from_bytes(&data).unwrap();
        assert_eq!(block.to_data(), data);
    }

    #[test]
    fn test_truncated_transaction_resets_block() {
        let data = hex::decode(ENCODED_MAINNET_GENESIS_BLOCK).unwrap();
        let mut block = Block::genesis_mainnet().unwrap();
        let mut source = &data[..data.len() - 2];
        assert!(block.from_data(&mut source).is_err());
        assert_eq!(block, Block::default());
        assert!(!block.is_valid());
    }

    #[test]
    fn test_missing_transactions_fail() {
        let mut data = hex::decode(ENCODED_MAINNET_GENESIS_BLOCK).unwrap();
        data[80] = 0x02;
        assert!(Block::from_bytes(&data).is_err());
    }

    #[test]
    fn test_new_aligns_transaction_count() {
        let genesis = Block::genesis_mainnet().unwrap();
        let mut header = genesis.header.clone();
        header.set_transaction_count(7);

        let block = Block::new(header, genesis.transactions.clone());
        assert_eq!(block.header.transaction_count(), 1);
        assert_eq!(block, genesis);
    }

    #[test]
    fn test_writer_uses_held_transaction_count() {
        let mut block = Block::genesis_mainnet().unwrap();
        block.header.set_transaction_count(5);
        let data = block.to_data();
        assert_eq!(data[80], 0x01);
        assert_eq!(data.len() as u64, block.serialized_size());
    }

    #[test]
    fn test_is_valid_with_only_transactions() {
        let block = Block {
            header: Header::default(),
            transactions: vec![Transaction::default()],
        };
        assert!(block.is_valid());
        assert!(!Block::default().is_valid());
    }
}
