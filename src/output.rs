//! Transaction output: value and locking script

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::script::{ParseMode, Script, ScriptPattern};
use crate::serialize::{Reader, Serializable, Writer};

/// Output: 𝒯 = ℕ₆₄ × 𝒮
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Output {
    pub value: u64,
    pub script: Script,
}

impl Output {
    pub fn new(value: u64, script: Script) -> Self {
        Self { value, script }
    }

    pub fn is_valid(&self) -> bool {
        self.value != 0 || self.script.is_valid()
    }

    /// Output template of the locking script
    pub fn pattern(&self) -> ScriptPattern {
        self.script.output_pattern()
    }

    fn deserialize<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.value = source.read_u64_le()?;
        self.script
            .from_data_with(source, true, ParseMode::RawDataFallback)?;
        Ok(())
    }
}

impl Serializable for Output {
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();
        let result = self.deserialize(source);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        sink.write_u64_le(self.value);
        self.script.to_writer_with(sink, true);
    }

    fn serialized_size(&self) -> u64 {
        8 + self.script.serialized_size_with(true)
    }

    fn reset(&mut self) {
        self.value = 0;
        self.script.reset();
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tvalue = {}", self.value)?;
        write!(f, "\t{}", self.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::pattern::to_pay_key_hash_pattern;
    use crate::script::Opcode;

    #[test]
    fn test_round_trip() {
        let output = Output::new(5_000_000_000, Script::new(to_pay_key_hash_pattern(&[7; 20])));
        let data = output.to_data();
        assert_eq!(data.len(), 34);
        assert_eq!(&data[..8], &5_000_000_000u64.to_le_bytes());
        assert_eq!(data[8], 25);

        let decoded = Output::from_bytes(&data).unwrap();
        assert_eq!(decoded, output);
        assert_eq!(decoded.pattern(), ScriptPattern::PayKeyHash);
    }

    #[test]
    fn test_malformed_script_is_kept_raw() {
        let mut data = 1u64.to_le_bytes().to_vec();
        data.extend_from_slice(&[0x02, 0x4e, 0x01]);

        let output = Output::from_bytes(&data).unwrap();
        assert_eq!(output.script.operations[0].code, Opcode::RawData);
        assert_eq!(output.pattern(), ScriptPattern::NonStandard);
        assert_eq!(output.to_data(), data);
    }

    #[test]
    fn test_truncated_value_resets() {
        let mut output = Output::new(9, Script::default());
        let mut source: &[u8] = &[0x01, 0x02, 0x03];
        assert!(output.from_data(&mut source).is_err());
        assert_eq!(output, Output::default());
        assert!(!output.is_valid());
    }

    #[test]
    fn test_truncated_script_resets() {
        let mut data = 1u64.to_le_bytes().to_vec();
        data.extend_from_slice(&[0x05, 0x51]);
        assert!(Output::from_bytes(&data).is_err());
    }
}
