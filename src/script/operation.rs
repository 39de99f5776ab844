//! Operation: a single opcode and its push payload

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SPECIAL_PUSH_SIZE;
use crate::error::Result;
use crate::script::opcode::Opcode;
use crate::serialize::{Reader, Serializable, Writer};
use crate::types::ByteString;

/// Operation: 𝒪𝓅 = 𝒞 × 𝕊
///
/// `data` is non-empty only for the push codes (`Special`, `PushData1/2/4`)
/// and for `RawData`, which holds captured bytes without an opcode byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub code: Opcode,
    pub data: ByteString,
}

impl Operation {
    /// Operation without payload
    pub fn new(code: Opcode) -> Self {
        Self {
            code,
            data: Vec::new(),
        }
    }

    /// Operation with an explicit code, which may be a non-minimal push
    pub fn with_data(code: Opcode, data: ByteString) -> Self {
        Self { code, data }
    }

    /// Smallest push encoding for `data`
    pub fn push(data: impl Into<ByteString>) -> Self {
        let data = data.into();
        let code = match data.len() {
            0 => Opcode::Zero,
            1..=MAX_SPECIAL_PUSH_SIZE => Opcode::Special,
            len if len <= u8::MAX as usize => Opcode::PushData1,
            len if len <= u16::MAX as usize => Opcode::PushData2,
            _ => Opcode::PushData4,
        };
        Self { code, data }
    }

    /// Opaque bytes re-emitted verbatim, without an opcode byte
    pub fn raw(data: impl Into<ByteString>) -> Self {
        Self {
            code: Opcode::RawData,
            data: data.into(),
        }
    }

    /// True when the payload fits the code, so encoding is lossless.
    pub fn is_valid(&self) -> bool {
        let size = self.data.len() as u64;
        match self.code {
            Opcode::Special => (1..=MAX_SPECIAL_PUSH_SIZE as u64).contains(&size),
            Opcode::PushData1 => size <= u8::MAX as u64,
            Opcode::PushData2 => size <= u16::MAX as u64,
            Opcode::PushData4 => size <= u32::MAX as u64,
            Opcode::RawData => true,
            // Must not collide with a byte that decodes to another code.
            Opcode::BadOperation(byte) => {
                size == 0 && Opcode::from_byte(byte) == Opcode::BadOperation(byte)
            }
            _ => size == 0,
        }
    }

    fn deserialize<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        let byte = source.read_byte()?;
        let code = Opcode::from_byte(byte);

        if code.must_read_data() {
            let size = match code {
                Opcode::Special => byte as u64,
                Opcode::PushData1 => source.read_byte()? as u64,
                Opcode::PushData2 => source.read_u16_le()? as u64,
                _ => source.read_u32_le()? as u64,
            };
            self.data = source.read_data(size)?;
        }

        self.code = code;
        Ok(())
    }
}

impl Serializable for Operation {
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.reset();
        let result = self.deserialize(source);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        if self.code != Opcode::RawData {
            // Special carries its length in the opcode byte.
            let raw_byte = self.code.to_byte().unwrap_or(self.data.len() as u8);
            sink.write_byte(raw_byte);

            match self.code {
                Opcode::PushData1 => sink.write_byte(self.data.len() as u8),
                Opcode::PushData2 => sink.write_u16_le(self.data.len() as u16),
                Opcode::PushData4 => sink.write_u32_le(self.data.len() as u32),
                _ => {}
            }
        }

        sink.write_bytes(&self.data);
    }

    fn serialized_size(&self) -> u64 {
        let opcode_size = if self.code == Opcode::RawData { 0 } else { 1 };
        opcode_size + self.code.length_prefix_size() + self.data.len() as u64
    }

    fn reset(&mut self) {
        self.code = Opcode::Zero;
        self.data.clear();
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "[ {} ]", hex::encode(&self.data))
        }
    }
}
