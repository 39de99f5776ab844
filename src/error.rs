//! Error types for wire decoding

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Truncated data: expected {expected} bytes, found {found}")]
    Truncated { expected: u64, found: u64 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid script: {0}")]
    InvalidScript(String),

    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("Hex decoding failed: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => CodecError::UnexpectedEof,
            _ => CodecError::Io(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
