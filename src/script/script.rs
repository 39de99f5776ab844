//! Script: ordered operation sequence with lenient decode modes

use std::fmt;
use std::io::Read;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::hashing::hash160;
use crate::script::operation::Operation;
use crate::script::pattern::{self, ScriptPattern};
use crate::serialize::{variable_uint_size, Reader, Serializable, Writer};
use crate::types::{ByteString, ShortHash};

/// How strictly script bytes are decoded into operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseMode {
    /// Any malformed operation fails the parse
    #[default]
    Strict,
    /// Capture every byte as a single raw operation without decoding
    RawData,
    /// Decode strictly, capturing the bytes raw if that fails
    RawDataFallback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub operations: Vec<Operation>,
}

impl Script {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Parse script bytes from `source`.
    ///
    /// With `prefix` the byte length is read first as a var-int; without it
    /// the rest of `source` is consumed. The length prefix itself must be
    /// satisfied in every mode; only the operation grammar is relaxed.
    pub fn from_data_with<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        prefix: bool,
        mode: ParseMode,
    ) -> Result<()> {
        self.reset();
        let result = self.deserialize(source, prefix, mode);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn deserialize<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        prefix: bool,
        mode: ParseMode,
    ) -> Result<()> {
        let bytes = if prefix {
            let size = source.read_var_int()?;
            source.read_data(size)?
        } else {
            let mut bytes = Vec::new();
            source.read_to_end(&mut bytes)?;
            bytes
        };

        self.operations = match mode {
            ParseMode::Strict => parse_operations(&bytes)?,
            ParseMode::RawData => vec![Operation::raw(bytes)],
            ParseMode::RawDataFallback => match parse_operations(&bytes) {
                Ok(operations) => operations,
                Err(err) => {
                    debug!("capturing {} script bytes raw: {}", bytes.len(), err);
                    vec![Operation::raw(bytes)]
                }
            },
        };

        Ok(())
    }

    pub fn to_writer_with<W: Writer + ?Sized>(&self, sink: &mut W, prefix: bool) {
        if prefix {
            sink.write_var_int(self.operations_size());
        }

        for operation in &self.operations {
            operation.to_writer(sink);
        }
    }

    pub fn to_data_with(&self, prefix: bool) -> ByteString {
        let mut data = Vec::with_capacity(self.serialized_size_with(prefix) as usize);
        self.to_writer_with(&mut data, prefix);
        data
    }

    pub fn serialized_size_with(&self, prefix: bool) -> u64 {
        let size = self.operations_size();
        if prefix {
            size + variable_uint_size(size)
        } else {
            size
        }
    }

    fn operations_size(&self) -> u64 {
        self.operations.iter().map(|op| op.serialized_size()).sum()
    }

    pub fn is_valid(&self) -> bool {
        !self.operations.is_empty()
    }

    pub fn is_push_only(&self) -> bool {
        pattern::is_push_only(&self.operations)
    }

    /// Best matching standard template
    pub fn pattern(&self) -> ScriptPattern {
        pattern::pattern(&self.operations)
    }

    /// Best matching output template, ignoring input templates
    pub fn output_pattern(&self) -> ScriptPattern {
        pattern::output_pattern(&self.operations)
    }

    /// HASH160 of the unprefixed serialization, as committed to by P2SH
    pub fn script_hash(&self) -> ShortHash {
        hash160(&self.to_data_with(false))
    }

    /// P2SH output paying to this script as redeem script
    pub fn to_pay_script_hash_pattern(&self) -> Vec<Operation> {
        pattern::to_pay_script_hash_pattern(&self.script_hash())
    }
}

/// Decode every operation in `data`, failing on the first malformed one.
fn parse_operations(data: &[u8]) -> Result<Vec<Operation>> {
    let mut source = data;
    let mut operations = Vec::new();

    while !source.is_empty() {
        let operation = Operation::factory_from_data(&mut source).map_err(|err| {
            CodecError::InvalidScript(format!("operation {}: {}", operations.len(), err))
        })?;
        operations.push(operation);
    }

    Ok(operations)
}

impl Serializable for Script {
    /// Length-prefixed, strict
    fn from_data<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<()> {
        self.from_data_with(source, true, ParseMode::Strict)
    }

    fn to_writer<W: Writer + ?Sized>(&self, sink: &mut W) {
        self.to_writer_with(sink, true);
    }

    fn serialized_size(&self) -> u64 {
        self.serialized_size_with(true)
    }

    fn reset(&mut self) {
        self.operations.clear();
    }
}

impl From<Vec<Operation>> for Script {
    fn from(operations: Vec<Operation>) -> Self {
        Self::new(operations)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, operation) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", operation)?;
        }
        Ok(())
    }
}
