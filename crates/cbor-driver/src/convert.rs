//! Conversion between [`CborValue`] and `serde_json::Value`.
//!
//! Byte strings travel through JSON as `data:` URIs. Times become RFC3339
//! text and tags are unwrapped, so converting to JSON is lossy.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{CborError, Result};
use crate::time::format_rfc3339_nano;
use crate::value::CborValue;

/// Binary data URI prefix: `data:application/octet-stream;base64,`
pub const BIN_URI_START: &str = "data:application/octet-stream;base64,";

/// Convert `CborValue` to `serde_json::Value`.
///
/// Non-finite floats become `null`. Map keys must be text.
pub fn cbor_to_json(v: &CborValue) -> Result<JsonValue> {
    Ok(match v {
        CborValue::Nil => JsonValue::Null,
        CborValue::Bool(b) => JsonValue::Bool(*b),
        CborValue::Int(i) => JsonValue::Number((*i).into()),
        CborValue::Uint(u) => JsonValue::Number((*u).into()),
        CborValue::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        CborValue::Bytes(b) => JsonValue::String(format!("{BIN_URI_START}{}", B64.encode(b))),
        CborValue::Text(s) => JsonValue::String(s.clone()),
        CborValue::Array(items) => {
            JsonValue::Array(items.iter().map(cbor_to_json).collect::<Result<_>>()?)
        }
        CborValue::Map(pairs) => {
            let mut obj = Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                let CborValue::Text(key) = k else {
                    return Err(CborError::NonTextMapKey(kind(k)));
                };
                obj.insert(key.clone(), cbor_to_json(v)?);
            }
            JsonValue::Object(obj)
        }
        CborValue::Tag(_, inner) => cbor_to_json(inner)?,
        CborValue::Time(t) => JsonValue::String(format_rfc3339_nano(t)),
    })
}

/// Convert `serde_json::Value` to `CborValue`.
///
/// Strings carrying a valid binary data URI become byte strings.
pub fn json_to_cbor(v: &JsonValue) -> CborValue {
    match v {
        JsonValue::Null => CborValue::Nil,
        JsonValue::Bool(b) => CborValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(u) = n.as_u64() {
                CborValue::Uint(u)
            } else if let Some(i) = n.as_i64() {
                CborValue::Int(i)
            } else {
                CborValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => match s.strip_prefix(BIN_URI_START).map(|b64| B64.decode(b64)) {
            Some(Ok(bytes)) => CborValue::Bytes(bytes),
            _ => CborValue::Text(s.clone()),
        },
        JsonValue::Array(items) => CborValue::Array(items.iter().map(json_to_cbor).collect()),
        JsonValue::Object(obj) => CborValue::Map(
            obj.iter()
                .map(|(k, v)| (CborValue::Text(k.clone()), json_to_cbor(v)))
                .collect(),
        ),
    }
}

fn kind(v: &CborValue) -> &'static str {
    match v {
        CborValue::Nil => "nil",
        CborValue::Bool(_) => "bool",
        CborValue::Int(_) | CborValue::Uint(_) => "integer",
        CborValue::Float(_) => "float",
        CborValue::Bytes(_) => "bytes",
        CborValue::Text(_) => "string",
        CborValue::Array(_) => "array",
        CborValue::Map(_) => "map",
        CborValue::Tag(..) => "tag",
        CborValue::Time(_) => "time",
    }
}
