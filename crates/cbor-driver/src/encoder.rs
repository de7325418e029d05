//! `CborEncDriver`: writes CBOR primitives and container boundaries.

use chrono::{DateTime, Utc};

use crate::constants::*;
use crate::error::Result;
use crate::handle::{CborHandle, Ext};
use crate::io::EncWrite;
use crate::time::{epoch_parts, format_rfc3339_nano, round_to_micros};
use crate::value::CborValue;

/// CBOR encoder driver bound to one sink and one handle.
///
/// Each call emits exactly the bytes of one primitive or container boundary;
/// the caller is responsible for nesting. Integers always take the shortest
/// form, floats are written at the requested width.
///
/// ```
/// use cbor_driver::{CborEncDriver, CborHandle};
///
/// let h = CborHandle::new();
/// let mut enc = CborEncDriver::new(Vec::new(), &h);
/// enc.write_map_start(1).unwrap();
/// enc.encode_str("a").unwrap();
/// enc.encode_int(-1).unwrap();
/// enc.write_map_end().unwrap();
/// assert_eq!(enc.into_inner(), [0xa1, 0x61, b'a', 0x20]);
/// ```
pub struct CborEncDriver<'h, W> {
    w: W,
    h: &'h CborHandle,
}

impl<'h, W: EncWrite> CborEncDriver<'h, W> {
    pub fn new(w: W, h: &'h CborHandle) -> Self {
        Self { w, h }
    }

    pub fn handle(&self) -> &'h CborHandle {
        self.h
    }

    pub fn get_ref(&self) -> &W {
        &self.w
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    /// Rebinds the driver to a new sink, returning the old one.
    pub fn reset(&mut self, w: W) -> W {
        std::mem::replace(&mut self.w, w)
    }

    /// Writes `v` under the major type overlay `base` in the shortest form.
    fn enc_uint(&mut self, v: u64, base: u8) -> Result<()> {
        if v <= MINOR_INLINE_MAX as u64 {
            self.w.write_u8(base | v as u8)
        } else if v <= u8::MAX as u64 {
            self.w.write_all(&[base | MINOR_U8, v as u8])
        } else if v <= u16::MAX as u64 {
            self.w.write_u8u16(base | MINOR_U16, v as u16)
        } else if v <= u32::MAX as u64 {
            self.w.write_u8u32(base | MINOR_U32, v as u32)
        } else {
            self.w.write_u8u64(base | MINOR_U64, v)
        }
    }

    #[inline]
    fn enc_len(&mut self, base: u8, length: usize) -> Result<()> {
        self.enc_uint(length as u64, base)
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        self.w.write_u8(BD_NIL)
    }

    pub fn encode_bool(&mut self, b: bool) -> Result<()> {
        self.w.write_u8(if b { BD_TRUE } else { BD_FALSE })
    }

    pub fn encode_int(&mut self, v: i64) -> Result<()> {
        if v < 0 {
            self.enc_uint((-1 - v) as u64, BASE_NEG_INT)
        } else {
            self.enc_uint(v as u64, BASE_UINT)
        }
    }

    pub fn encode_uint(&mut self, v: u64) -> Result<()> {
        self.enc_uint(v, BASE_UINT)
    }

    pub fn encode_f32(&mut self, f: f32) -> Result<()> {
        self.w.write_u8u32(BD_FLOAT32, f.to_bits())
    }

    pub fn encode_f64(&mut self, f: f64) -> Result<()> {
        self.w.write_u8u64(BD_FLOAT64, f.to_bits())
    }

    pub fn encode_str(&mut self, s: &str) -> Result<()> {
        self.enc_string_bytes(BASE_STRING, s.as_bytes(), |i| s.is_char_boundary(i))
    }

    /// `None` encodes as nil, not as an empty byte string.
    pub fn encode_bytes(&mut self, v: Option<&[u8]>) -> Result<()> {
        match v {
            None => self.encode_nil(),
            Some(v) => self.enc_string_bytes(BASE_BYTES, v, |_| true),
        }
    }

    fn enc_string_bytes(
        &mut self,
        base: u8,
        v: &[u8],
        is_boundary: impl Fn(usize) -> bool,
    ) -> Result<()> {
        if !self.h.options.indefinite_length {
            self.enc_len(base, v.len())?;
            return self.w.write_all(v);
        }
        self.w.write_u8(if base == BASE_BYTES {
            BD_INDEFINITE_BYTES
        } else {
            BD_INDEFINITE_STRING
        })?;
        let chunk = chunk_len(v.len());
        tracing::trace!(len = v.len(), chunk, "cbor: encoding chunked string");
        let mut i = 0;
        while i < v.len() {
            let mut end = (i + chunk).min(v.len());
            // Text chunks must each be valid UTF-8.
            while end > i + 1 && !is_boundary(end) {
                end -= 1;
            }
            self.enc_len(base, end - i)?;
            self.w.write_all(&v[i..end])?;
            i = end;
        }
        self.w.write_u8(BD_BREAK)
    }

    /// In indefinite mode `length` only informs the caller's iteration.
    pub fn write_array_start(&mut self, length: usize) -> Result<()> {
        if self.h.options.indefinite_length {
            self.w.write_u8(BD_INDEFINITE_ARRAY)
        } else {
            self.enc_len(BASE_ARRAY, length)
        }
    }

    pub fn write_array_end(&mut self) -> Result<()> {
        if self.h.options.indefinite_length {
            self.w.write_u8(BD_BREAK)
        } else {
            Ok(())
        }
    }

    /// `length` counts key/value pairs.
    pub fn write_map_start(&mut self, length: usize) -> Result<()> {
        if self.h.options.indefinite_length {
            self.w.write_u8(BD_INDEFINITE_MAP)
        } else {
            self.enc_len(BASE_MAP, length)
        }
    }

    pub fn write_map_end(&mut self) -> Result<()> {
        if self.h.options.indefinite_length {
            self.w.write_u8(BD_BREAK)
        } else {
            Ok(())
        }
    }

    /// Writes only the tag header; the caller writes the wrapped value next.
    pub fn write_tag_header(&mut self, tag: u64) -> Result<()> {
        self.enc_uint(tag, BASE_TAG)
    }

    /// Writes the self-describe tag `0xd9d9f7`.
    pub fn encode_self_describe(&mut self) -> Result<()> {
        self.write_tag_header(TAG_SELF_DESCRIBE)
    }

    pub fn encode_tag(&mut self, tag: u64, value: &CborValue) -> Result<()> {
        self.write_tag_header(tag)?;
        self.encode_value(value)
    }

    /// Raw tag + value; a missing value encodes as nil.
    pub fn encode_raw_ext(&mut self, tag: u64, value: Option<&CborValue>) -> Result<()> {
        self.write_tag_header(tag)?;
        match value {
            Some(v) => self.encode_value(v),
            None => self.encode_nil(),
        }
    }

    pub fn encode_ext(&mut self, tag: u64, value: &CborValue, ext: &Ext) -> Result<()> {
        self.write_tag_header(tag)?;
        match ext {
            Ext::SelfDescribing => self.encode_value(value),
            Ext::Converter(conv) => match conv.convert_ext(value) {
                Some(payload) => self.encode_value(&payload),
                None => self.encode_nil(),
            },
        }
    }

    /// `None` encodes as nil. Numeric mode normalises to UTC and rounds to
    /// microseconds; whole seconds are written as an integer.
    pub fn encode_time(&mut self, t: Option<&DateTime<Utc>>) -> Result<()> {
        let Some(t) = t else {
            return self.encode_nil();
        };
        if self.h.options.time_rfc3339 {
            self.write_tag_header(TAG_DATE_TIME)?;
            self.encode_str(&format_rfc3339_nano(t))
        } else {
            self.write_tag_header(TAG_EPOCH)?;
            let (sec, nsec) = epoch_parts(&round_to_micros(*t));
            if nsec == 0 {
                self.encode_int(sec)
            } else {
                self.encode_f64(sec as f64 + nsec as f64 / 1e9)
            }
        }
    }

    /// Walks a dynamic value, issuing the primitive calls for its shape.
    pub fn encode_value(&mut self, value: &CborValue) -> Result<()> {
        match value {
            CborValue::Nil => self.encode_nil(),
            CborValue::Bool(b) => self.encode_bool(*b),
            CborValue::Int(i) => self.encode_int(*i),
            CborValue::Uint(u) => self.encode_uint(*u),
            CborValue::Float(f) => self.encode_f64(*f),
            CborValue::Bytes(b) => self.encode_bytes(Some(b)),
            CborValue::Text(s) => self.encode_str(s),
            CborValue::Array(items) => {
                self.write_array_start(items.len())?;
                for item in items {
                    self.encode_value(item)?;
                }
                self.write_array_end()
            }
            CborValue::Map(pairs) => {
                self.write_map_start(pairs.len())?;
                for (k, v) in pairs {
                    self.encode_value(k)?;
                    self.encode_value(v)?;
                }
                self.write_map_end()
            }
            CborValue::Tag(tag, v) => self.encode_raw_ext(*tag, Some(v)),
            CborValue::Time(t) => self.encode_time(Some(t)),
        }
    }
}

/// Chunk size for indefinite-length strings: a quarter of the payload,
/// clamped to 64..=1024 bytes.
fn chunk_len(total: usize) -> usize {
    (total / 4).clamp(64, 1024)
}
