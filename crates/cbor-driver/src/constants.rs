//! CBOR wire constants (RFC 7049).

// MAJOR type values (bits 7-5 of the descriptor byte)
pub const MAJOR_UINT: u8 = 0b000;
pub const MAJOR_NEG_INT: u8 = 0b001;
pub const MAJOR_BYTES: u8 = 0b010;
pub const MAJOR_STRING: u8 = 0b011;
pub const MAJOR_ARRAY: u8 = 0b100;
pub const MAJOR_MAP: u8 = 0b101;
pub const MAJOR_TAG: u8 = 0b110;
pub const MAJOR_SIMPLE_OR_FLOAT: u8 = 0b111;

// MAJOR type overlays (major shifted to bits 7-5)
pub const BASE_UINT: u8 = 0b000_00000;
pub const BASE_NEG_INT: u8 = 0b001_00000;
pub const BASE_BYTES: u8 = 0b010_00000;
pub const BASE_STRING: u8 = 0b011_00000;
pub const BASE_ARRAY: u8 = 0b100_00000;
pub const BASE_MAP: u8 = 0b101_00000;
pub const BASE_TAG: u8 = 0b110_00000;

pub const MINOR_MASK: u8 = 0b11111;

// Minor values selecting 1/2/4/8 trailing big-endian bytes.
pub const MINOR_U8: u8 = 0x18;
pub const MINOR_U16: u8 = 0x19;
pub const MINOR_U32: u8 = 0x1a;
pub const MINOR_U64: u8 = 0x1b;
/// Largest value carried inline in the descriptor.
pub const MINOR_INLINE_MAX: u8 = 0x17;

// Simple values and float selectors (major 7)
pub const BD_FALSE: u8 = 0xf4;
pub const BD_TRUE: u8 = 0xf5;
pub const BD_NIL: u8 = 0xf6;
pub const BD_UNDEFINED: u8 = 0xf7;
pub const BD_FLOAT16: u8 = 0xf9;
pub const BD_FLOAT32: u8 = 0xfa;
pub const BD_FLOAT64: u8 = 0xfb;

// Indefinite-length markers
pub const BD_INDEFINITE_BYTES: u8 = 0x5f;
pub const BD_INDEFINITE_STRING: u8 = 0x7f;
pub const BD_INDEFINITE_ARRAY: u8 = 0x9f;
pub const BD_INDEFINITE_MAP: u8 = 0xbf;

/// CBOR "break" stop code.
pub const BD_BREAK: u8 = 0xff;

/// Self-describe CBOR tag number (encoded as `0xd9d9f7`).
pub const TAG_SELF_DESCRIBE: u64 = 55799;

/// Tag for RFC3339 date/time text.
pub const TAG_DATE_TIME: u64 = 0;
/// Tag for numeric seconds since the epoch.
pub const TAG_EPOCH: u64 = 1;

#[inline]
pub const fn major(bd: u8) -> u8 {
    bd >> 5
}

#[inline]
pub const fn minor(bd: u8) -> u8 {
    bd & MINOR_MASK
}
