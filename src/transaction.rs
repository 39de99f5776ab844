//! Transaction wire codec and structural queries

use std::fmt;
use std::io::Read;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::LOCKTIME_THRESHOLD;
use crate::error::Result;
use crate::hashing::{bitcoin_hash, encode_hash};
use crate::input::Input;
use crate::output::Output;
use crate::serialize::{variable_uint_size, Reader, Serializable, Writer};
use crate::types::Hash;

/// Transaction: 𝒯𝒳 = ℕ₃₂ × [ℐ] × [𝒯] × ℕ₃₂
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub locktime: u32,
}

impl Transaction {
    pub fn new(version: u32, inputs: Vec<Input>, outputs: Vec<Output>, locktime: u32) -> Self {
        Self {
            version,
            inputs,
            outputs,
            locktime,
        }
    }

    /// Double SHA-256 of the serialization
    pub fn hash(&self) -> Hash {
        bitcoin_hash(&self.to_data())
    }

    /// A single input spending the null outpoint
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// IsFinal: 𝒯𝒳 × ℕ × ℕ → {true, false}
    ///
    /// 1. If locktime = 0: final
    /// 2. Compare locktime against the block height when below the
    ///    threshold, otherwise against the block time; final if smaller
    /// 3. Otherwise final only if every input sequence is final
    pub fn is_final(&self, block_height: u64, block_time: u32) -> bool {
        if self.locktime == 0 {
            return true;
        }

        let max_locktime = if self.locktime < LOCKTIME_THRESHOLD {
            block_height
        } else {
            block_time as u64
        };

        if (self.locktime as u64) < max_locktime {
            return true;
        }

        self.inputs.iter().all(Input::is_final)
    }

    /// Σ output values, saturating at u64::MAX
    pub fn total_output_value(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |total, output| total.saturating_add(output.value))
    }

    pub fn is_valid(&self) -> bool {
        self.version != 0
            || self.locktime != 0
            || !self.inputs.is_empty()
            || !self.outputs.is_empty()
    }

    fn deserialize<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.version = source.read_u32_le()?;

        // Counts are untrusted, so nothing is reserved up front.
        let input_count = source.read_var_int()?;
        for index in 0..input_count {
            let input = Input::factory_from_data(source).map_err(|err| {
                debug!("transaction input {} of {} failed: {}", index, input_count, err);
                err
            })?;
            self.inputs.push(input);
        }

        let output_count = source.read_var_int()?;
        for index in 0..output_count {
            let output = Output::factory_from_data(source).map_err(|err| {
                debug!("transaction output {} of {} failed: {}", index, output_count, err);
                err
            })?;
            self.outputs.push(output);
        }

        self.locktime = source.read_u32_le()?;
        Ok(())
    }
}

impl Serializable for Transaction {
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();
        let result = self.deserialize(source);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        sink.write_u32_le(self.version);

        sink.write_var_int(self.inputs.len() as u64);
        for input in &self.inputs {
            input.to_writer(sink);
        }

        sink.write_var_int(self.outputs.len() as u64);
        for output in &self.outputs {
            output.to_writer(sink);
        }

        sink.write_u32_le(self.locktime);
    }

    fn serialized_size(&self) -> u64 {
        let inputs: u64 = self.inputs.iter().map(Input::serialized_size).sum();
        let outputs: u64 = self.outputs.iter().map(Output::serialized_size).sum();

        4 + variable_uint_size(self.inputs.len() as u64)
            + inputs
            + variable_uint_size(self.outputs.len() as u64)
            + outputs
            + 4
    }

    fn reset(&mut self) {
        self.version = 0;
        self.inputs.clear();
        self.outputs.clear();
        self.locktime = 0;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction {}", encode_hash(&self.hash()))?;
        writeln!(f, "version = {}", self.version)?;
        for input in &self.inputs {
            writeln!(f, "input:\n{}", input)?;
        }
        for output in &self.outputs {
            writeln!(f, "output:\n{}", output)?;
        }
        write!(f, "locktime = {}", self.locktime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_INPUT_SEQUENCE;
    use crate::point::OutPoint;
    use crate::script::pattern::to_pay_key_hash_pattern;
    use crate::script::{Operation, Script};

    fn spending_transaction(sequence: u32, locktime: u32) -> Transaction {
        Transaction::new(
            1,
            vec![Input::new(
                OutPoint::new([0x22; 32], 0),
                Script::new(vec![Operation::push(vec![0x30; 71])]),
                sequence,
            )],
            vec![
                Output::new(1000, Script::new(to_pay_key_hash_pattern(&[1; 20]))),
                Output::new(2000, Script::new(to_pay_key_hash_pattern(&[2; 20]))),
            ],
            locktime,
        )
    }

    #[test]
    fn test_round_trip() {
        let tx = spending_transaction(MAX_INPUT_SEQUENCE, 0);
        let data = tx.to_data();
        assert_eq!(data.len() as u64, tx.serialized_size());
        assert_eq!(Transaction::from_bytes(&data).unwrap(), tx);
    }

    #[test]
    fn test_truncated_resets() {
        let data = spending_transaction(MAX_INPUT_SEQUENCE, 0).to_data();
        for cut in [1, 5, 50, data.len() - 1] {
            let mut tx = spending_transaction(1, 1);
            let mut source = &data[..cut];
            assert!(tx.from_data(&mut source).is_err(), "cut at {}", cut);
            assert_eq!(tx, Transaction::default());
        }
    }

    #[test]
    fn test_huge_declared_count_fails_cleanly() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(Transaction::from_bytes(&data).is_err());
    }

    #[test]
    fn test_is_coinbase() {
        let mut tx = spending_transaction(0, 0);
        assert!(!tx.is_coinbase());
        tx.inputs[0].previous_output = OutPoint::null();
        assert!(tx.is_coinbase());
        tx.inputs.push(Input::default());
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn test_is_final_by_height() {
        assert!(spending_transaction(0, 0).is_final(0, 0));

        let tx = spending_transaction(0, 100);
        assert!(tx.is_final(101, 0));
        assert!(!tx.is_final(100, 0));
        assert!(!tx.is_final(50, u32::MAX));

        let tx = spending_transaction(MAX_INPUT_SEQUENCE, 100);
        assert!(tx.is_final(50, 0));
    }

    #[test]
    fn test_is_final_by_time() {
        let tx = spending_transaction(0, LOCKTIME_THRESHOLD + 10);
        assert!(tx.is_final(0, LOCKTIME_THRESHOLD + 11));
        assert!(!tx.is_final(u64::MAX, LOCKTIME_THRESHOLD + 10));
    }

    #[test]
    fn test_total_output_value() {
        assert_eq!(spending_transaction(0, 0).total_output_value(), 3000);

        let mut tx = spending_transaction(0, 0);
        tx.outputs[0].value = u64::MAX;
        assert_eq!(tx.total_output_value(), u64::MAX);
    }

    #[test]
    fn test_is_valid() {
        assert!(!Transaction::default().is_valid());
        assert!(spending_transaction(0, 0).is_valid());
    }
}
