//! RFC 7049 CBOR encoder and decoder drivers.
//!
//! The drivers translate one primitive at a time between a byte stream and
//! the caller's value walk:
//!
//! - [`CborEncDriver`] writes integers in their shortest form, floats at the
//!   requested width, strings either whole or chunked, and container
//!   boundaries either counted or break-terminated.
//! - [`CborDecDriver`] reads with one byte of descriptor lookahead so the
//!   caller can ask what comes next ([`CborDecDriver::container_type`],
//!   [`CborDecDriver::try_decode_as_nil`], [`CborDecDriver::check_break`])
//!   before committing to a decode.
//!
//! [`CborValue`] plus [`encode`] and [`decode`] give a ready-made value engine
//! on top of the drivers.
//!
//! # Example
//!
//! ```
//! use cbor_driver::{decode, encode, CborHandle, CborValue};
//!
//! let h = CborHandle::new();
//! let value = CborValue::Array(vec![CborValue::from(23u64), CborValue::from(-1i64)]);
//! let bytes = encode(&value, &h).unwrap();
//! assert_eq!(bytes, [0x82, 0x17, 0x20]);
//! assert_eq!(decode(&bytes, &h).unwrap(), value);
//! ```

pub mod constants;
pub mod convert;
mod decoder;
pub mod descriptor;
mod encoder;
mod error;
mod handle;
pub mod io;
mod numeric;
mod shared;
mod time;
mod value;

pub use convert::{cbor_to_json, json_to_cbor};
pub use decoder::CborDecDriver;
pub use descriptor::{describe, Descriptor, Major};
pub use encoder::CborEncDriver;
pub use error::{CborError, Result};
pub use handle::{CborHandle, CborOptions, Ext, InterfaceExt};
pub use io::{DecRead, EncWrite, IoRead, IoWrite, SliceRead};
pub use shared::{decode, decode_from_reader, decode_with_consumed, encode, encode_to_writer};
pub use value::{CborValue, ContainerType, Naked};
