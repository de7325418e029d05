//! Dynamic values produced and consumed by the drivers.

use chrono::{DateTime, Utc};

/// A self-describing CBOR data item.
///
/// `Tag` pairs an unrecognised tag number with its wrapped value. Map
/// entries keep wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    Nil,
    Bool(bool),
    /// Negative integers, and non-negative ones when the handle asks for
    /// signed integers.
    ///
    /// The wire has no signed/unsigned distinction for values >= 0, so
    /// `Int(5)` is written as uint 5 and reads back as `Uint(5)` unless
    /// `signed_integer` is set. `From<i64>` picks the variant that survives
    /// a default round-trip.
    Int(i64),
    Uint(u64),
    /// Half, single and double precision all widen to `f64`.
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborValue>),
    Map(Vec<(CborValue, CborValue)>),
    Tag(u64, Box<CborValue>),
    /// Tag 0 or 1, normalised to UTC at microsecond precision.
    Time(DateTime<Utc>),
}

impl CborValue {
    pub fn tag(tag: u64, value: CborValue) -> Self {
        CborValue::Tag(tag, Box::new(value))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, CborValue::Nil)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CborValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for CborValue {
    fn from(b: bool) -> Self {
        CborValue::Bool(b)
    }
}

impl From<i64> for CborValue {
    fn from(i: i64) -> Self {
        if i >= 0 {
            CborValue::Uint(i as u64)
        } else {
            CborValue::Int(i)
        }
    }
}

impl From<u64> for CborValue {
    fn from(u: u64) -> Self {
        CborValue::Uint(u)
    }
}

impl From<f64> for CborValue {
    fn from(f: f64) -> Self {
        CborValue::Float(f)
    }
}

impl From<&str> for CborValue {
    fn from(s: &str) -> Self {
        CborValue::Text(s.to_owned())
    }
}

impl From<String> for CborValue {
    fn from(s: String) -> Self {
        CborValue::Text(s)
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(b: Vec<u8>) -> Self {
        CborValue::Bytes(b)
    }
}

impl From<DateTime<Utc>> for CborValue {
    fn from(t: DateTime<Utc>) -> Self {
        CborValue::Time(t)
    }
}

/// Result of a schema-less decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Naked {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Time(DateTime<Utc>),
    /// An array header is cached; continue with `read_array_start`.
    Array,
    /// A map header is cached; continue with `read_map_start`.
    Map,
    /// A tag header was consumed; the wrapped value is next in the stream.
    Tag(u64),
}

/// What the next item is, as far as container dispatch cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    Nil,
    Bytes,
    String,
    Array,
    Map,
    Unset,
}
