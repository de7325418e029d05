//! Descriptor byte classification.

use std::fmt;

use crate::constants::*;

/// One of the eight CBOR major types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Major {
    Uint,
    NegInt,
    Bytes,
    String,
    Array,
    Map,
    Tag,
    SimpleOrFloat,
}

impl Major {
    /// Major type selected by the top three bits of `bd`.
    pub const fn of(bd: u8) -> Self {
        match major(bd) {
            MAJOR_UINT => Major::Uint,
            MAJOR_NEG_INT => Major::NegInt,
            MAJOR_BYTES => Major::Bytes,
            MAJOR_STRING => Major::String,
            MAJOR_ARRAY => Major::Array,
            MAJOR_MAP => Major::Map,
            MAJOR_TAG => Major::Tag,
            _ => Major::SimpleOrFloat,
        }
    }

    /// Numeric major type (0-7).
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Major {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Major::Uint => "uint",
            Major::NegInt => "negint",
            Major::Bytes => "bytes",
            Major::String => "string",
            Major::Array => "array",
            Major::Map => "map",
            Major::Tag => "tag",
            Major::SimpleOrFloat => "simple/float",
        };
        write!(f, "{} ({})", self.code(), name)
    }
}

/// A classified descriptor byte.
///
/// Definite-length variants carry the 5-bit minor value; it is either the
/// literal argument (0-23) or the width selector for the trailing integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Uint(u8),
    NegInt(u8),
    Bytes(u8),
    String(u8),
    Array(u8),
    Map(u8),
    Tag(u8),
    IndefiniteBytes,
    IndefiniteString,
    IndefiniteArray,
    IndefiniteMap,
    False,
    True,
    Nil,
    Undefined,
    Float16,
    Float32,
    Float64,
    Break,
    /// Any other major-7 value (unassigned simple values, `0xf8`, reserved).
    Simple(u8),
}

impl Descriptor {
    pub const fn classify(bd: u8) -> Self {
        match bd {
            BD_INDEFINITE_BYTES => Descriptor::IndefiniteBytes,
            BD_INDEFINITE_STRING => Descriptor::IndefiniteString,
            BD_INDEFINITE_ARRAY => Descriptor::IndefiniteArray,
            BD_INDEFINITE_MAP => Descriptor::IndefiniteMap,
            BD_FALSE => Descriptor::False,
            BD_TRUE => Descriptor::True,
            BD_NIL => Descriptor::Nil,
            BD_UNDEFINED => Descriptor::Undefined,
            BD_FLOAT16 => Descriptor::Float16,
            BD_FLOAT32 => Descriptor::Float32,
            BD_FLOAT64 => Descriptor::Float64,
            BD_BREAK => Descriptor::Break,
            _ => {
                let m = minor(bd);
                match Major::of(bd) {
                    Major::Uint => Descriptor::Uint(m),
                    Major::NegInt => Descriptor::NegInt(m),
                    Major::Bytes => Descriptor::Bytes(m),
                    Major::String => Descriptor::String(m),
                    Major::Array => Descriptor::Array(m),
                    Major::Map => Descriptor::Map(m),
                    Major::Tag => Descriptor::Tag(m),
                    Major::SimpleOrFloat => Descriptor::Simple(m),
                }
            }
        }
    }

    /// Short diagnostic label used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Descriptor::Uint(_) => "(u)int",
            Descriptor::NegInt(_) => "int",
            Descriptor::Bytes(_) => "bytes",
            Descriptor::String(_) => "string",
            Descriptor::Array(_) => "array",
            Descriptor::Map(_) => "map",
            Descriptor::Tag(_) => "tag",
            Descriptor::IndefiniteBytes => "bytes*",
            Descriptor::IndefiniteString => "string*",
            Descriptor::IndefiniteArray => "array*",
            Descriptor::IndefiniteMap => "map*",
            Descriptor::False => "false",
            Descriptor::True => "true",
            Descriptor::Nil => "nil",
            Descriptor::Undefined => "undefined",
            Descriptor::Float16 | Descriptor::Float32 | Descriptor::Float64 => "float",
            Descriptor::Break => "break",
            Descriptor::Simple(_) => "unknown(simple)",
        }
    }
}

/// Diagnostic label for a raw descriptor byte.
pub const fn describe(bd: u8) -> &'static str {
    Descriptor::classify(bd).label()
}
