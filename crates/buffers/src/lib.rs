//! Binary buffer utilities for cbor-driver.
//!
//! # Overview
//!
//! - [`Reader`] - bounds-checked big-endian cursor over a byte slice
//! - [`Writer`] - auto-growing output buffer
//! - [`decode_f16`] / [`half_to_f32_bits`] - IEEE-754 half-precision expansion
//!
//! # Example
//!
//! ```
//! use cbor_driver_buffers::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8u16(0x19, 0x0203);
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8(), Ok(0x19));
//! assert_eq!(reader.array::<2>(), Ok([0x02, 0x03]));
//! assert!(reader.u8().is_err());
//! ```

mod f16;
mod reader;
mod writer;

pub use f16::{decode_f16, half_to_f32_bits};
pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer,
    /// Cursor moved before the start of the buffer.
    Overflow,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer => write!(f, "end of buffer"),
            BufferError::Overflow => write!(f, "buffer overflow"),
        }
    }
}

impl std::error::Error for BufferError {}
