//! Half-precision (16-bit) floating point utilities.

/// Expands the bit pattern of an IEEE 754 half-precision float into the bit
/// pattern of the equal single-precision float.
///
/// Subnormal halves are renormalised, infinities keep their sign and NaN
/// payloads are shifted into the top of the single-precision mantissa.
pub fn half_to_f32_bits(h: u16) -> u32 {
    let h = h as u32;
    let sign = (h & 0x8000) << 16;
    let exp = (h >> 10) & 0x1f;
    let mut mant = h & 0x03ff;

    if exp == 0x1f {
        // Infinity or NaN
        return sign | 0x7f80_0000 | (mant << 13);
    }
    if exp == 0 {
        if mant == 0 {
            return sign;
        }
        // Subnormal: shift until the implicit bit appears.
        let mut e: i32 = 0;
        while mant & 0x0400 == 0 {
            mant <<= 1;
            e -= 1;
        }
        mant &= 0x03ff;
        let exp32 = (127 - 15 + 1 + e) as u32;
        return sign | (exp32 << 23) | (mant << 13);
    }
    sign | ((exp + (127 - 15)) << 23) | (mant << 13)
}

/// Decodes a half-precision (16-bit) floating point value, widened to `f64`.
///
/// # Example
///
/// ```
/// use cbor_driver_buffers::decode_f16;
///
/// assert_eq!(decode_f16(0x3C00), 1.0);
/// assert_eq!(decode_f16(0xC400), -4.0);
/// assert!(decode_f16(0x7C00).is_infinite());
/// assert!(decode_f16(0x7E00).is_nan());
/// ```
pub fn decode_f16(binary: u16) -> f64 {
    f32::from_bits(half_to_f32_bits(binary)) as f64
}
