//! Shared convenience wrappers for CBOR encode/decode.

use std::io;

use cbor_driver_buffers::Writer;

use crate::decoder::CborDecDriver;
use crate::encoder::CborEncDriver;
use crate::error::Result;
use crate::handle::CborHandle;
use crate::io::{IoRead, IoWrite, SliceRead};
use crate::value::CborValue;

/// Encode a [`CborValue`] into CBOR bytes.
pub fn encode(value: &CborValue, h: &CborHandle) -> Result<Vec<u8>> {
    let mut enc = CborEncDriver::new(Writer::new(), h);
    enc.encode_value(value)?;
    Ok(enc.into_inner().flush())
}

/// Decode the first CBOR item in `blob`. Trailing bytes are ignored.
pub fn decode(blob: &[u8], h: &CborHandle) -> Result<CborValue> {
    decode_with_consumed(blob, h).map(|(value, _)| value)
}

/// Decode the first CBOR item in `blob`, also returning how many bytes it
/// occupied.
pub fn decode_with_consumed(blob: &[u8], h: &CborHandle) -> Result<(CborValue, usize)> {
    let mut dec = CborDecDriver::new(SliceRead::new(blob), h);
    let value = dec.decode_value()?;
    Ok((value, dec.get_ref().position()))
}

pub fn encode_to_writer<W: io::Write>(value: &CborValue, w: W, h: &CborHandle) -> Result<W> {
    let mut enc = CborEncDriver::new(IoWrite(w), h);
    enc.encode_value(value)?;
    Ok(enc.into_inner().into_inner())
}

/// Decode one item from `r`. Bytes after the item are left unread.
pub fn decode_from_reader<R: io::Read>(r: R, h: &CborHandle) -> Result<CborValue> {
    CborDecDriver::new(IoRead::new(r), h).decode_value()
}
