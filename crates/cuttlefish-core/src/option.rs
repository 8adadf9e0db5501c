//! Typed CoAP options

use crate::{Error, MediaType, Result};
use bytes::Bytes;
use std::fmt;

/// Value format of an option, fixed per option type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionFormat {
    /// Unsigned integer
    Integer,
    /// Opaque byte sequence
    Opaque,
    /// UTF-8 string
    String,
}

/// Option types the gateway translates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionType {
    /// If-Match (1)
    IfMatch,
    /// ETag (4)
    ETag,
    /// If-None-Match (5)
    IfNoneMatch,
    /// Location-Path (8)
    LocationPath,
    /// Content-Format (12)
    ContentType,
    /// Max-Age (14)
    MaxAge,
    /// Accept (17)
    Accept,
    /// Location-Query (20)
    LocationQuery,
    /// Proxy-Uri (35)
    ProxyUri,
}

impl OptionType {
    /// Option number from the CoAP option registry
    pub fn number(self) -> u16 {
        match self {
            Self::IfMatch => 1,
            Self::ETag => 4,
            Self::IfNoneMatch => 5,
            Self::LocationPath => 8,
            Self::ContentType => 12,
            Self::MaxAge => 14,
            Self::Accept => 17,
            Self::LocationQuery => 20,
            Self::ProxyUri => 35,
        }
    }

    /// Value format of this option type
    pub fn format(self) -> OptionFormat {
        match self {
            Self::ContentType | Self::MaxAge | Self::Accept => OptionFormat::Integer,
            Self::IfMatch | Self::ETag | Self::IfNoneMatch => OptionFormat::Opaque,
            Self::LocationPath | Self::LocationQuery | Self::ProxyUri => OptionFormat::String,
        }
    }

    /// Whether more than one instance may appear in a message
    pub fn is_repeatable(self) -> bool {
        matches!(
            self,
            Self::IfMatch | Self::ETag | Self::LocationPath | Self::LocationQuery
        )
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IfMatch => "If-Match",
            Self::ETag => "ETag",
            Self::IfNoneMatch => "If-None-Match",
            Self::LocationPath => "Location-Path",
            Self::ContentType => "Content-Format",
            Self::MaxAge => "Max-Age",
            Self::Accept => "Accept",
            Self::LocationQuery => "Location-Query",
            Self::ProxyUri => "Proxy-Uri",
        };
        f.write_str(name)
    }
}

/// Option value, tagged by format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Integer value
    Integer(u32),
    /// Opaque value
    Opaque(Bytes),
    /// String value
    String(String),
}

impl OptionValue {
    /// Format of this value
    pub fn format(&self) -> OptionFormat {
        match self {
            Self::Integer(_) => OptionFormat::Integer,
            Self::Opaque(_) => OptionFormat::Opaque,
            Self::String(_) => OptionFormat::String,
        }
    }
}

/// A single option: type plus a value matching the type's format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapOption {
    option_type: OptionType,
    value: OptionValue,
}

impl CoapOption {
    /// Create an option, checking the value against the type's format
    pub fn new(option_type: OptionType, value: OptionValue) -> Result<Self> {
        if option_type.format() != value.format() {
            return Err(Error::InvalidOption(format!(
                "{option_type} expects {:?}, got {:?}",
                option_type.format(),
                value.format()
            )));
        }
        Ok(Self { option_type, value })
    }

    /// Max-Age option
    pub fn max_age(seconds: u32) -> Self {
        Self {
            option_type: OptionType::MaxAge,
            value: OptionValue::Integer(seconds),
        }
    }

    /// Content-Format option
    pub fn content_type(media_type: MediaType) -> Self {
        Self {
            option_type: OptionType::ContentType,
            value: OptionValue::Integer(u32::from(media_type.0)),
        }
    }

    /// Proxy-Uri option
    pub fn proxy_uri(uri: impl Into<String>) -> Self {
        Self {
            option_type: OptionType::ProxyUri,
            value: OptionValue::String(uri.into()),
        }
    }

    /// Option type
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Option value
    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    /// Integer value, if this is an integer option
    pub fn as_integer(&self) -> Option<u32> {
        match self.value {
            OptionValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// String value, if this is a string option
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            OptionValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Opaque value, if this is an opaque option
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            OptionValue::Opaque(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered multimap of options.
///
/// Options are kept sorted by option number; instances of a repeatable
/// option keep their insertion order. Adding a non-repeatable option
/// replaces any existing instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<CoapOption>,
}

impl Options {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option
    pub fn add(&mut self, option: CoapOption) {
        let option_type = option.option_type();
        if !option_type.is_repeatable() {
            self.remove(option_type);
        }
        let at = self
            .entries
            .iter()
            .position(|o| o.option_type().number() > option_type.number())
            .unwrap_or(self.entries.len());
        self.entries.insert(at, option);
    }

    /// Remove every instance of an option type, returning how many were removed
    pub fn remove(&mut self, option_type: OptionType) -> usize {
        let before = self.entries.len();
        self.entries.retain(|o| o.option_type() != option_type);
        before - self.entries.len()
    }

    /// First instance of an option type
    pub fn get(&self, option_type: OptionType) -> Option<&CoapOption> {
        self.entries.iter().find(|o| o.option_type() == option_type)
    }

    /// All instances of an option type, in order
    pub fn get_all(&self, option_type: OptionType) -> impl Iterator<Item = &CoapOption> {
        self.entries
            .iter()
            .filter(move |o| o.option_type() == option_type)
    }

    /// Whether at least one instance of the option type is present
    pub fn contains(&self, option_type: OptionType) -> bool {
        self.get(option_type).is_some()
    }

    /// Iterate in option-number order
    pub fn iter(&self) -> std::slice::Iter<'_, CoapOption> {
        self.entries.iter()
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<CoapOption> for Options {
    fn extend<T: IntoIterator<Item = CoapOption>>(&mut self, iter: T) {
        for option in iter {
            self.add(option);
        }
    }
}

impl FromIterator<CoapOption> for Options {
    fn from_iter<T: IntoIterator<Item = CoapOption>>(iter: T) -> Self {
        let mut options = Options::new();
        options.extend(iter);
        options
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = &'a CoapOption;
    type IntoIter = std::slice::Iter<'a, CoapOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
