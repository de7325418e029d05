use cbor_driver_buffers::BufferError;
use thiserror::Error;

use crate::descriptor::Major;

/// Error type for CBOR encoding/decoding operations.
#[derive(Debug, Error)]
pub enum CborError {
    #[error("invalid descriptor decoding {context}: {bd:#04x}/{desc}")]
    InvalidDescriptor {
        context: &'static str,
        bd: u8,
        desc: &'static str,
    },
    #[error("error reading {context}; expected major type {expected}, got {got} from descriptor {bd:#04x}/{desc}")]
    UnexpectedMajor {
        context: &'static str,
        expected: Major,
        got: Major,
        bd: u8,
        desc: &'static str,
    },
    #[error("integer overflow: {value} does not fit in {target}")]
    IntegerOverflow { value: i128, target: &'static str },
    #[error("cannot assign negative signed value to unsigned type {target}")]
    NegativeToUnsigned { target: &'static str },
    #[error("invalid tag for timestamp - expecting 0 or 1, got {0:#x}")]
    InvalidTimeTag(u64),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("wrong extension tag: got {got}, expecting {expected}")]
    ExtensionTagMismatch { expected: u64, got: u64 },
    #[error("extension conversion failed: {0}")]
    Extension(String),
    #[error("invalid utf-8 in text string")]
    InvalidUtf8,
    #[error("JSON object keys must be strings, got {0}")]
    NonTextMapKey(&'static str),
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BufferError> for CborError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfBuffer | BufferError::Overflow => CborError::UnexpectedEof,
        }
    }
}

pub type Result<T> = std::result::Result<T, CborError>;
