//! Per-codec configuration and extension registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::CborValue;

/// Encode/decode settings. Read-only while a driver is in use.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use cbor_driver::CborOptions;
///
/// let opts: CborOptions =
///     serde_json::from_str(r#"{"indefinite_length": true}"#).unwrap();
/// assert!(opts.indefinite_length);
/// assert!(!opts.time_rfc3339);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CborOptions {
    /// Emit arrays, maps, bytes and text as indefinite-length items.
    pub indefinite_length: bool,
    /// Encode timestamps as tag 0 + RFC3339 text instead of tag 1 + seconds.
    pub time_rfc3339: bool,
    /// Discard tags that have no registered extension before decoding the
    /// wrapped value. This also skips the self-describe tag `0xd9d9f7`.
    pub skip_unexpected_tags: bool,
    /// Naked decode yields `Int` rather than `Uint` for major type 0.
    pub signed_integer: bool,
    /// Naked decode yields text for byte strings.
    pub raw_to_string: bool,
    /// Upper bound on speculative pre-allocation for wire-declared lengths.
    pub max_init_len: usize,
    /// Nesting limit for [`crate::CborDecDriver::decode_value`].
    pub max_depth: usize,
}

impl Default for CborOptions {
    fn default() -> Self {
        Self {
            indefinite_length: false,
            time_rfc3339: false,
            skip_unexpected_tags: false,
            signed_integer: false,
            raw_to_string: false,
            max_init_len: 1024 * 1024,
            max_depth: 256,
        }
    }
}

/// Conversion between an extension's in-memory value and the payload that
/// follows its tag on the wire.
pub trait InterfaceExt: Send + Sync {
    /// In-memory value to wire payload. `None` encodes as nil.
    fn convert_ext(&self, value: &CborValue) -> Option<CborValue>;

    /// Wire payload to in-memory value.
    fn update_ext(&self, payload: CborValue) -> Result<CborValue>;
}

/// How a registered tag is handled.
#[derive(Clone)]
pub enum Ext {
    /// The wrapped value is the extension's own shape; it is encoded and
    /// decoded directly with extension lookup disabled for that item.
    SelfDescribing,
    /// The wrapped value goes through an external converter.
    Converter(Arc<dyn InterfaceExt>),
}

impl Ext {
    pub fn converter<T: InterfaceExt + 'static>(ext: T) -> Self {
        Ext::Converter(Arc::new(ext))
    }
}

impl fmt::Debug for Ext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ext::SelfDescribing => f.write_str("SelfDescribing"),
            Ext::Converter(_) => f.write_str("Converter(..)"),
        }
    }
}

/// Options plus the tag → extension registry, shared by reference between
/// any number of drivers.
#[derive(Debug, Clone, Default)]
pub struct CborHandle {
    pub options: CborOptions,
    exts: BTreeMap<u64, Ext>,
}

impl From<CborOptions> for CborHandle {
    fn from(options: CborOptions) -> Self {
        Self {
            options,
            exts: BTreeMap::new(),
        }
    }
}

impl CborHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the handle: `cbor`.
    pub fn name(&self) -> &'static str {
        "cbor"
    }

    /// Registers `ext` for `tag`, returning the previous registration.
    pub fn set_ext(&mut self, tag: u64, ext: Ext) -> Option<Ext> {
        self.exts.insert(tag, ext)
    }

    pub fn remove_ext(&mut self, tag: u64) -> Option<Ext> {
        self.exts.remove(&tag)
    }

    pub fn ext_for_tag(&self, tag: u64) -> Option<&Ext> {
        self.exts.get(&tag)
    }
}
