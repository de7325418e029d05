//! Overflow-checked numeric coercion for decoded integers.

use std::any::type_name;

use crate::error::{CborError, Result};

/// Reverses the negative-integer transform (`value = -1 - encoded`) and
/// checks that the result fits an `i64`.
pub fn signed_from_wire(ui: u64, neg: bool) -> Result<i64> {
    let value = wire_value(ui, neg);
    i64::try_from(value).map_err(|_| CborError::IntegerOverflow {
        value,
        target: "i64",
    })
}

/// Full-range value of a uint/negint payload.
#[inline]
pub fn wire_value(ui: u64, neg: bool) -> i128 {
    if neg {
        -1 - ui as i128
    } else {
        ui as i128
    }
}

/// Narrows a decoded signed integer to `T`.
pub fn narrow_signed<T: TryFrom<i64>>(value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| CborError::IntegerOverflow {
        value: value as i128,
        target: short_name::<T>(),
    })
}

/// Narrows a decoded unsigned integer to `T`.
pub fn narrow_unsigned<T: TryFrom<u64>>(value: u64) -> Result<T> {
    T::try_from(value).map_err(|_| CborError::IntegerOverflow {
        value: value as i128,
        target: short_name::<T>(),
    })
}

/// Narrows an `f64` to `f32`; finite values outside the `f32` range fail.
pub fn narrow_f32(value: f64) -> Result<f32> {
    if value.is_finite() && value.abs() > f32::MAX as f64 {
        return Err(CborError::IntegerOverflow {
            value: value as i128,
            target: "f32",
        });
    }
    Ok(value as f32)
}

pub(crate) fn short_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
