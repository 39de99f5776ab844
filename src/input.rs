//! Transaction input: the spent outpoint, its unlocking script and sequence

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_INPUT_SEQUENCE;
use crate::error::Result;
use crate::point::OutPoint;
use crate::script::{ParseMode, Script};
use crate::serialize::{Reader, Serializable, Writer};

/// Input: ℐ = 𝒪 × 𝒮 × ℕ₃₂
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Input {
    pub previous_output: OutPoint,
    pub script: Script,
    pub sequence: u32,
}

impl Input {
    pub fn new(previous_output: OutPoint, script: Script, sequence: u32) -> Self {
        Self {
            previous_output,
            script,
            sequence,
        }
    }

    /// Spends the null outpoint
    pub fn is_coinbase(&self) -> bool {
        self.previous_output.is_null()
    }

    /// is_final ⇔ sequence = 0xFFFFFFFF
    pub fn is_final(&self) -> bool {
        self.sequence == MAX_INPUT_SEQUENCE
    }

    pub fn is_valid(&self) -> bool {
        self.previous_output.is_valid() || self.script.is_valid() || self.sequence != 0
    }

    fn deserialize<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.previous_output.from_data(source)?;

        // Coinbase scripts are arbitrary data and are never decoded.
        let mode = if self.previous_output.is_null() {
            ParseMode::RawData
        } else {
            ParseMode::RawDataFallback
        };
        self.script.from_data_with(source, true, mode)?;

        self.sequence = source.read_u32_le()?;
        Ok(())
    }
}

impl Serializable for Input {
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();
        let result = self.deserialize(source);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        self.previous_output.to_writer(sink);
        self.script.to_writer_with(sink, true);
        sink.write_u32_le(self.sequence);
    }

    fn serialized_size(&self) -> u64 {
        self.previous_output.serialized_size() + self.script.serialized_size_with(true) + 4
    }

    fn reset(&mut self) {
        self.previous_output.reset();
        self.script.reset();
        self.sequence = 0;
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.previous_output)?;
        writeln!(f, "\t{}", self.script)?;
        write!(f, "\tsequence = {}", self.sequence)
    }
}
