//! `CborDecDriver`: a pull parser with one byte of descriptor lookahead.

use std::borrow::Cow;

use cbor_driver_buffers::decode_f16;
use chrono::{DateTime, Utc};

use crate::constants::*;
use crate::descriptor::{describe, Descriptor, Major};
use crate::error::{CborError, Result};
use crate::handle::{CborHandle, Ext};
use crate::io::DecRead;
use crate::numeric::{
    narrow_f32, narrow_signed, narrow_unsigned, short_name, signed_from_wire, wire_value,
};
use crate::time::{from_epoch_seconds, parse_rfc3339, round_to_micros};
use crate::value::{CborValue, ContainerType, Naked};

/// The single buffered descriptor byte.
///
/// `take` is the only way to clear it, so every primitive that reads a
/// descriptor also releases it.
#[derive(Debug, Default, Clone, Copy)]
struct DescCache {
    bd: u8,
    valid: bool,
}

impl DescCache {
    #[inline]
    fn get(&self) -> Option<u8> {
        self.valid.then_some(self.bd)
    }

    #[inline]
    fn set(&mut self, bd: u8) {
        self.bd = bd;
        self.valid = true;
    }

    #[inline]
    fn take(&mut self) -> Option<u8> {
        let bd = self.get();
        self.valid = false;
        bd
    }
}

/// CBOR decoder driver bound to one source and one handle.
///
/// ```
/// use cbor_driver::{CborDecDriver, CborHandle, SliceRead};
///
/// let h = CborHandle::new();
/// let mut dec = CborDecDriver::new(SliceRead::new(&[0x82, 0x01, 0x38, 0x18]), &h);
/// assert_eq!(dec.read_array_start().unwrap(), Some(2));
/// assert_eq!(dec.decode_uint::<u8>().unwrap(), 1);
/// assert_eq!(dec.decode_int::<i8>().unwrap(), -25);
/// ```
pub struct CborDecDriver<'h, R> {
    r: R,
    h: &'h CborHandle,
    cache: DescCache,
    depth: usize,
}

impl<'de, 'h, R: DecRead<'de>> CborDecDriver<'h, R> {
    pub fn new(r: R, h: &'h CborHandle) -> Self {
        Self {
            r,
            h,
            cache: DescCache::default(),
            depth: 0,
        }
    }

    pub fn handle(&self) -> &'h CborHandle {
        self.h
    }

    pub fn get_ref(&self) -> &R {
        &self.r
    }

    /// Returns the source. A descriptor byte still cached is lost.
    pub fn into_inner(self) -> R {
        self.r
    }

    /// Rebinds the driver to a new source and clears the descriptor cache.
    pub fn reset(&mut self, r: R) -> R {
        self.cache = DescCache::default();
        self.depth = 0;
        std::mem::replace(&mut self.r, r)
    }

    #[inline]
    fn peek_bd(&mut self) -> Result<u8> {
        if let Some(bd) = self.cache.get() {
            return Ok(bd);
        }
        let bd = self.r.read_u8()?;
        self.cache.set(bd);
        Ok(bd)
    }

    #[inline]
    fn consume(&mut self) -> Result<u8> {
        match self.cache.take() {
            Some(bd) => Ok(bd),
            None => self.r.read_u8(),
        }
    }

    /// Like [`Self::peek_bd`], but discards leading tags when the handle
    /// skips unexpected tags.
    fn peek_value_bd(&mut self) -> Result<u8> {
        let mut bd = self.peek_bd()?;
        if !self.h.options.skip_unexpected_tags {
            return Ok(bd);
        }
        while major(bd) == MAJOR_TAG {
            self.cache.take();
            let tag = self.dec_uint(bd, "tag")?;
            tracing::trace!(tag, "cbor: skipping tag");
            bd = self.peek_bd()?;
        }
        Ok(bd)
    }

    /// Pushes a cached descriptor back onto the stream.
    pub fn uncache(&mut self) -> Result<()> {
        if self.cache.take().is_some() {
            self.r.unread_u8()?;
        }
        Ok(())
    }

    fn mismatch(&self, context: &'static str, expected: Major, bd: u8) -> CborError {
        tracing::debug!(context, bd, expected = %expected, "cbor: unexpected major type");
        CborError::UnexpectedMajor {
            context,
            expected,
            got: Major::of(bd),
            bd,
            desc: describe(bd),
        }
    }

    fn invalid(&self, context: &'static str, bd: u8) -> CborError {
        CborError::InvalidDescriptor {
            context,
            bd,
            desc: describe(bd),
        }
    }

    /// Reads the integer argument of an already consumed descriptor.
    fn dec_uint(&mut self, bd: u8, context: &'static str) -> Result<u64> {
        match minor(bd) {
            v @ 0..=MINOR_INLINE_MAX => Ok(v as u64),
            MINOR_U8 => Ok(self.r.read_u8()? as u64),
            MINOR_U16 => Ok(u16::from_be_bytes(self.r.read_array()?) as u64),
            MINOR_U32 => Ok(u32::from_be_bytes(self.r.read_array()?) as u64),
            MINOR_U64 => Ok(u64::from_be_bytes(self.r.read_array()?)),
            _ => Err(self.invalid(context, bd)),
        }
    }

    fn dec_len(&mut self, bd: u8, context: &'static str) -> Result<usize> {
        let n = self.dec_uint(bd, context)?;
        usize::try_from(n).map_err(|_| CborError::IntegerOverflow {
            value: n as i128,
            target: "usize",
        })
    }

    /// Pre-allocation bound for a wire-declared element count.
    fn init_len(&self, n: usize, elem_size: usize) -> usize {
        n.min(self.h.options.max_init_len / elem_size.max(1))
    }

    /// Non-consuming: what kind of item comes next.
    pub fn container_type(&mut self) -> Result<ContainerType> {
        let bd = self.peek_value_bd()?;
        Ok(match Descriptor::classify(bd) {
            Descriptor::Nil => ContainerType::Nil,
            Descriptor::Bytes(_) | Descriptor::IndefiniteBytes => ContainerType::Bytes,
            Descriptor::String(_) | Descriptor::IndefiniteString => ContainerType::String,
            Descriptor::Array(_) | Descriptor::IndefiniteArray => ContainerType::Array,
            Descriptor::Map(_) | Descriptor::IndefiniteMap => ContainerType::Map,
            Descriptor::Uint(_)
            | Descriptor::NegInt(_)
            | Descriptor::Tag(_)
            | Descriptor::False
            | Descriptor::True
            | Descriptor::Undefined
            | Descriptor::Float16
            | Descriptor::Float32
            | Descriptor::Float64
            | Descriptor::Break
            | Descriptor::Simple(_) => ContainerType::Unset,
        })
    }

    /// Consumes nil or undefined and reports `true`; otherwise leaves the
    /// descriptor cached. Tags are never skipped here.
    pub fn try_decode_as_nil(&mut self) -> Result<bool> {
        let bd = self.peek_bd()?;
        if bd == BD_NIL || bd == BD_UNDEFINED {
            self.cache.take();
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes the break marker and reports `true`; otherwise leaves the
    /// descriptor cached.
    pub fn check_break(&mut self) -> Result<bool> {
        let bd = self.peek_bd()?;
        if bd == BD_BREAK {
            self.cache.take();
            return Ok(true);
        }
        Ok(false)
    }

    /// Integer payload and sign of the next uint/negint item.
    fn dec_integer(&mut self, context: &'static str) -> Result<(u64, bool)> {
        let bd = self.peek_value_bd()?;
        let neg = match major(bd) {
            MAJOR_UINT => false,
            MAJOR_NEG_INT => true,
            _ => return Err(self.mismatch(context, Major::Uint, bd)),
        };
        self.cache.take();
        Ok((self.dec_uint(bd, context)?, neg))
    }

    fn dec_unsigned(&mut self, target: &'static str) -> Result<u64> {
        match self.dec_integer(target)? {
            (ui, false) => Ok(ui),
            (_, true) => Err(CborError::NegativeToUnsigned { target }),
        }
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        let (ui, neg) = self.dec_integer("i64")?;
        signed_from_wire(ui, neg)
    }

    pub fn decode_u64(&mut self) -> Result<u64> {
        self.dec_unsigned("u64")
    }

    /// Overflow-checked decode into a narrower signed integer.
    pub fn decode_int<T: TryFrom<i64>>(&mut self) -> Result<T> {
        let (ui, neg) = self.dec_integer(short_name::<T>())?;
        let value = signed_from_wire(ui, neg).map_err(|_| CborError::IntegerOverflow {
            value: wire_value(ui, neg),
            target: short_name::<T>(),
        })?;
        narrow_signed(value)
    }

    /// Overflow-checked decode into a narrower unsigned integer. Negative
    /// wire values fail with [`CborError::NegativeToUnsigned`].
    pub fn decode_uint<T: TryFrom<u64>>(&mut self) -> Result<T> {
        let ui = self.dec_unsigned(short_name::<T>())?;
        narrow_unsigned(ui)
    }

    /// Half, single and double precision floats, or an integer promoted to
    /// `f64`.
    pub fn decode_f64(&mut self) -> Result<f64> {
        let bd = self.peek_value_bd()?;
        let f = match Descriptor::classify(bd) {
            Descriptor::Float16 => {
                self.cache.take();
                decode_f16(u16::from_be_bytes(self.r.read_array()?))
            }
            Descriptor::Float32 => {
                self.cache.take();
                f32::from_bits(u32::from_be_bytes(self.r.read_array()?)) as f64
            }
            Descriptor::Float64 => {
                self.cache.take();
                f64::from_bits(u64::from_be_bytes(self.r.read_array()?))
            }
            Descriptor::Uint(_) | Descriptor::NegInt(_) => {
                let (ui, neg) = self.dec_integer("float")?;
                wire_value(ui, neg) as f64
            }
            _ => return Err(self.invalid("float", bd)),
        };
        Ok(f)
    }

    pub fn decode_f32(&mut self) -> Result<f32> {
        narrow_f32(self.decode_f64()?)
    }

    pub fn decode_bool(&mut self) -> Result<bool> {
        let bd = self.peek_value_bd()?;
        let b = match bd {
            BD_TRUE => true,
            BD_FALSE => false,
            _ => return Err(self.invalid("bool", bd)),
        };
        self.cache.take();
        Ok(b)
    }

    /// Pair count of a definite map, or `None` for an indefinite one (drain
    /// it with [`Self::check_break`]).
    pub fn read_map_start(&mut self) -> Result<Option<usize>> {
        self.read_container_start(MAJOR_MAP, BD_INDEFINITE_MAP, Major::Map, "map")
    }

    /// Item count of a definite array, or `None` for an indefinite one.
    pub fn read_array_start(&mut self) -> Result<Option<usize>> {
        self.read_container_start(MAJOR_ARRAY, BD_INDEFINITE_ARRAY, Major::Array, "array")
    }

    fn read_container_start(
        &mut self,
        want: u8,
        indefinite: u8,
        expected: Major,
        context: &'static str,
    ) -> Result<Option<usize>> {
        let bd = self.peek_value_bd()?;
        if bd == indefinite {
            self.cache.take();
            return Ok(None);
        }
        if major(bd) != want {
            return Err(self.mismatch(context, expected, bd));
        }
        self.cache.take();
        Ok(Some(self.dec_len(bd, context)?))
    }

    /// Appends the chunks of an indefinite string until the break marker.
    /// Every chunk must be a definite frame of `chunk_major`.
    fn dec_indefinite_chunks(&mut self, chunk_major: u8, buf: &mut Vec<u8>) -> Result<()> {
        let expected = Major::of(chunk_major << 5);
        loop {
            let bd = self.consume()?;
            if bd == BD_BREAK {
                return Ok(());
            }
            if major(bd) != chunk_major {
                return Err(self.mismatch("indefinite string chunk", expected, bd));
            }
            let n = self.dec_len(bd, "indefinite string chunk")?;
            if buf.len().saturating_add(n) > buf.capacity() {
                let target = buf
                    .capacity()
                    .saturating_mul(2)
                    .saturating_add(n.min(self.h.options.max_init_len));
                reserve_hint(buf, target.saturating_sub(buf.len()));
            }
            self.r.read_append(buf, n)?;
        }
    }

    /// Shared body of the bytes/string decodes. Returns `false` for nil or
    /// undefined. `legacy_arrays` accepts an array of byte-range integers.
    fn dec_string_bytes(
        &mut self,
        context: &'static str,
        expected: Major,
        legacy_arrays: bool,
        buf: &mut Vec<u8>,
    ) -> Result<bool> {
        let bd = self.peek_value_bd()?;
        match Descriptor::classify(bd) {
            Descriptor::Nil | Descriptor::Undefined => {
                self.cache.take();
                return Ok(false);
            }
            Descriptor::IndefiniteBytes | Descriptor::IndefiniteString => {
                self.cache.take();
                self.dec_indefinite_chunks(major(bd), buf)?;
            }
            Descriptor::IndefiniteArray if legacy_arrays => {
                self.cache.take();
                while !self.check_break()? {
                    buf.push(self.decode_uint::<u8>()?);
                }
            }
            Descriptor::Array(_) if legacy_arrays => {
                self.cache.take();
                let n = self.dec_len(bd, context)?;
                reserve_hint(buf, self.init_len(n, 1));
                for _ in 0..n {
                    buf.push(self.decode_uint::<u8>()?);
                }
            }
            Descriptor::Bytes(_) | Descriptor::String(_) => {
                self.cache.take();
                let n = self.dec_len(bd, context)?;
                self.r.read_append(buf, n)?;
            }
            _ => return Err(self.mismatch(context, expected, bd)),
        }
        Ok(true)
    }

    /// Clears `buf` and fills it with the next byte string. Returns `false`
    /// (leaving `buf` empty) for nil.
    pub fn decode_bytes_into(&mut self, buf: &mut Vec<u8>) -> Result<bool> {
        buf.clear();
        self.dec_string_bytes("bytes", Major::Bytes, true, buf)
    }

    /// `None` for nil or undefined.
    pub fn decode_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        Ok(self.decode_bytes_into(&mut buf)?.then_some(buf))
    }

    pub fn decode_string(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if !self.dec_string_bytes("string", Major::String, false, &mut buf)? {
            return Ok(None);
        }
        String::from_utf8(buf).map(Some).map_err(|_| CborError::InvalidUtf8)
    }

    /// Number of payload bytes of a definite bytes/text frame, consuming its
    /// header, or `None` if the next item is anything else.
    fn definite_frame_len(&mut self) -> Result<Option<usize>> {
        let bd = self.peek_value_bd()?;
        let m = major(bd);
        if (m == MAJOR_BYTES || m == MAJOR_STRING) && minor(bd) != MINOR_MASK {
            self.cache.take();
            return Ok(Some(self.dec_len(bd, "bytes")?));
        }
        Ok(None)
    }

    /// Borrows from the input when the source lends views and the item is
    /// a single definite frame; owns the bytes otherwise.
    pub fn decode_bytes_borrowed(&mut self) -> Result<Option<Cow<'de, [u8]>>> {
        let Some(n) = self.definite_frame_len()? else {
            return Ok(self.decode_bytes()?.map(Cow::Owned));
        };
        if let Some(view) = self.r.read_borrowed(n)? {
            return Ok(Some(Cow::Borrowed(view)));
        }
        let mut buf = Vec::new();
        self.r.read_append(&mut buf, n)?;
        Ok(Some(Cow::Owned(buf)))
    }

    pub fn decode_str_borrowed(&mut self) -> Result<Option<Cow<'de, str>>> {
        let Some(n) = self.definite_frame_len()? else {
            return Ok(self.decode_string()?.map(Cow::Owned));
        };
        if let Some(view) = self.r.read_borrowed(n)? {
            let s = std::str::from_utf8(view).map_err(|_| CborError::InvalidUtf8)?;
            return Ok(Some(Cow::Borrowed(s)));
        }
        let mut buf = Vec::new();
        self.r.read_append(&mut buf, n)?;
        let s = String::from_utf8(buf).map_err(|_| CborError::InvalidUtf8)?;
        Ok(Some(Cow::Owned(s)))
    }

    /// Tag 0 (RFC3339 text) or tag 1 (epoch seconds). `None` for nil.
    pub fn decode_time(&mut self) -> Result<Option<DateTime<Utc>>> {
        if self.try_decode_as_nil()? {
            return Ok(None);
        }
        let bd = self.peek_bd()?;
        if major(bd) != MAJOR_TAG {
            return Err(self.mismatch("time", Major::Tag, bd));
        }
        self.cache.take();
        let tag = self.dec_uint(bd, "time")?;
        self.dec_time_payload(tag).map(Some)
    }

    fn dec_time_payload(&mut self, tag: u64) -> Result<DateTime<Utc>> {
        let t = match tag {
            TAG_DATE_TIME => parse_rfc3339(&self.decode_string()?.unwrap_or_default())?,
            TAG_EPOCH => from_epoch_seconds(self.decode_f64()?)?,
            other => return Err(CborError::InvalidTimeTag(other)),
        };
        Ok(round_to_micros(t))
    }

    /// Decodes a tagged item for the extension registered under `xtag`.
    ///
    /// With no extension the raw tag and its wrapped value come back as
    /// [`CborValue::Tag`]. A registered extension must see exactly `xtag`.
    pub fn decode_ext(&mut self, xtag: u64, ext: Option<&Ext>) -> Result<CborValue> {
        let bd = self.peek_bd()?;
        if major(bd) != MAJOR_TAG {
            return Err(self.mismatch("ext", Major::Tag, bd));
        }
        self.cache.take();
        let tag = self.dec_uint(bd, "ext")?;
        match ext {
            None => Ok(CborValue::tag(tag, self.decode_value()?)),
            Some(_) if tag != xtag => {
                tracing::debug!(expected = xtag, got = tag, "cbor: extension tag mismatch");
                Err(CborError::ExtensionTagMismatch {
                    expected: xtag,
                    got: tag,
                })
            }
            Some(ext) => self.dec_ext_payload(tag, ext),
        }
    }

    fn dec_ext_payload(&mut self, tag: u64, ext: &Ext) -> Result<CborValue> {
        match ext {
            Ext::SelfDescribing => self.decode_value_with(false),
            Ext::Converter(conv) => {
                let payload = self.decode_value()?;
                conv.update_ext(payload).inspect_err(|e| {
                    tracing::debug!(tag, error = %e, "cbor: extension rejected payload");
                })
            }
        }
    }

    /// Schema-less decode of the next item.
    ///
    /// Containers are not descended into: for [`Naked::Array`] and
    /// [`Naked::Map`] the header stays cached for `read_*_start`.
    pub fn decode_naked(&mut self) -> Result<Naked> {
        loop {
            let bd = self.peek_bd()?;
            let naked = match Descriptor::classify(bd) {
                Descriptor::Uint(_) if self.h.options.signed_integer => {
                    Naked::Int(self.decode_i64()?)
                }
                Descriptor::Uint(_) => Naked::Uint(self.decode_u64()?),
                Descriptor::NegInt(_) => Naked::Int(self.decode_i64()?),
                Descriptor::Bytes(_) | Descriptor::IndefiniteBytes => {
                    let bytes = self.decode_bytes()?.unwrap_or_default();
                    if self.h.options.raw_to_string {
                        Naked::Text(String::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)?)
                    } else {
                        Naked::Bytes(bytes)
                    }
                }
                Descriptor::String(_) | Descriptor::IndefiniteString => {
                    Naked::Text(self.decode_string()?.unwrap_or_default())
                }
                Descriptor::Array(_) | Descriptor::IndefiniteArray => Naked::Array,
                Descriptor::Map(_) | Descriptor::IndefiniteMap => Naked::Map,
                Descriptor::Tag(_) => {
                    self.cache.take();
                    let tag = self.dec_uint(bd, "tag")?;
                    if tag == TAG_DATE_TIME || tag == TAG_EPOCH {
                        Naked::Time(self.dec_time_payload(tag)?)
                    } else if self.h.options.skip_unexpected_tags && self.h.ext_for_tag(tag).is_none() {
                        tracing::trace!(tag, "cbor: skipping tag");
                        continue;
                    } else {
                        Naked::Tag(tag)
                    }
                }
                Descriptor::Nil | Descriptor::Undefined => {
                    self.cache.take();
                    Naked::Nil
                }
                Descriptor::False | Descriptor::True => Naked::Bool(self.decode_bool()?),
                Descriptor::Float16 | Descriptor::Float32 | Descriptor::Float64 => {
                    Naked::Float(self.decode_f64()?)
                }
                Descriptor::Break | Descriptor::Simple(_) => {
                    return Err(self.invalid("naked", bd));
                }
            };
            return Ok(naked);
        }
    }

    /// Decodes one complete item, dispatching registered tags through their
    /// extensions. Nesting is limited by the handle's `max_depth`.
    pub fn decode_value(&mut self) -> Result<CborValue> {
        self.decode_value_with(true)
    }

    fn decode_value_with(&mut self, exts: bool) -> Result<CborValue> {
        let max = self.h.options.max_depth;
        if self.depth >= max {
            return Err(CborError::DepthLimitExceeded(max));
        }
        self.depth += 1;
        let out = self.dec_value(exts);
        self.depth -= 1;
        out
    }

    fn dec_value(&mut self, exts: bool) -> Result<CborValue> {
        let h = self.h;
        let value = match self.decode_naked()? {
            Naked::Nil => CborValue::Nil,
            Naked::Bool(b) => CborValue::Bool(b),
            Naked::Int(i) => CborValue::Int(i),
            Naked::Uint(u) => CborValue::Uint(u),
            Naked::Float(f) => CborValue::Float(f),
            Naked::Bytes(b) => CborValue::Bytes(b),
            Naked::Text(s) => CborValue::Text(s),
            Naked::Time(t) => CborValue::Time(t),
            Naked::Array => {
                let mut items = Vec::new();
                match self.read_array_start()? {
                    Some(n) => {
                        let hint = self.init_len(n, std::mem::size_of::<CborValue>());
                        reserve_hint(&mut items, hint);
                        for _ in 0..n {
                            items.push(self.decode_value()?);
                        }
                    }
                    None => {
                        while !self.check_break()? {
                            items.push(self.decode_value()?);
                        }
                    }
                }
                CborValue::Array(items)
            }
            Naked::Map => {
                let mut pairs = Vec::new();
                match self.read_map_start()? {
                    Some(n) => {
                        let hint = self.init_len(n, 2 * std::mem::size_of::<CborValue>());
                        reserve_hint(&mut pairs, hint);
                        for _ in 0..n {
                            let k = self.decode_value()?;
                            pairs.push((k, self.decode_value()?));
                        }
                    }
                    None => {
                        while !self.check_break()? {
                            let k = self.decode_value()?;
                            pairs.push((k, self.decode_value()?));
                        }
                    }
                }
                CborValue::Map(pairs)
            }
            Naked::Tag(tag) => match exts.then(|| h.ext_for_tag(tag)).flatten() {
                Some(ext) => self.dec_ext_payload(tag, ext)?,
                None => CborValue::tag(tag, self.decode_value()?),
            },
        };
        Ok(value)
    }
}

/// Speculative pre-allocation. A refused reservation is not an error: the
/// reads that follow grow `v` as data actually arrives.
fn reserve_hint<T>(v: &mut Vec<T>, additional: usize) {
    if v.try_reserve(additional).is_err() {
        tracing::trace!(additional, "cbor: speculative reservation refused");
    }
}
