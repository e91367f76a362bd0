//! Text encodings supported for payload content conversion.
//!
//! Character-set names arrive from configuration as strings and are resolved
//! once, at the boundary, into a [`ContentEncoding`]. Conversions themselves
//! never fail: unrepresentable characters are replaced (`?` on encode,
//! U+FFFD on decode), matching the replace-on-unmappable behaviour pipeline
//! operators expect from charset conversion.

use crate::message::error::MessageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported text encoding for converting payload bytes to and from text.
///
/// # Examples
///
/// ```
/// use dunnage::message::domain::ContentEncoding;
///
/// let encoding = ContentEncoding::resolve("ISO-8859-1").expect("known charset");
/// assert_eq!(encoding, ContentEncoding::Latin1);
/// assert_eq!(encoding.canonical_name(), "ISO-8859-1");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncoding {
    /// UTF-8, the default encoding.
    #[default]
    #[serde(rename = "UTF-8")]
    Utf8,
    /// Seven-bit US-ASCII.
    #[serde(rename = "US-ASCII")]
    Ascii,
    /// ISO-8859-1 (Latin-1).
    #[serde(rename = "ISO-8859-1")]
    Latin1,
    /// UTF-16, big-endian byte order.
    #[serde(rename = "UTF-16BE")]
    Utf16Be,
    /// UTF-16, little-endian byte order.
    #[serde(rename = "UTF-16LE")]
    Utf16Le,
}

impl ContentEncoding {
    /// Resolves a character-set name to a supported encoding.
    ///
    /// Matching is case-insensitive and tolerant of the common alias forms
    /// (`"utf8"`, `"latin1"`, `"US-ASCII"`, ...). A bare `"UTF-16"` resolves
    /// to the big-endian variant.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::UnsupportedEncoding`] when the name does not
    /// correspond to a supported encoding.
    pub fn resolve(name: &str) -> Result<Self, MessageError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            "utf-16" | "utf16" | "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            "utf-16le" | "utf16le" => Ok(Self::Utf16Le),
            _ => Err(MessageError::unsupported_encoding(name)),
        }
    }

    /// Returns the canonical character-set name for this encoding.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Ascii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
        }
    }

    /// Encodes text into bytes under this encoding.
    ///
    /// Characters the encoding cannot represent are replaced with `?`.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| {
                    if c.is_ascii() {
                        u8::try_from(c).unwrap_or(b'?')
                    } else {
                        b'?'
                    }
                })
                .collect(),
            Self::Latin1 => text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect(),
            Self::Utf16Be => encode_utf16(text, u16::to_be_bytes),
            Self::Utf16Le => encode_utf16(text, u16::to_le_bytes),
        }
    }

    /// Decodes bytes into text under this encoding.
    ///
    /// Invalid sequences decode to U+FFFD rather than failing; callers that
    /// need strict validation should inspect the payload bytes directly.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '\u{FFFD}' })
                .collect(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
        }
    }
}

fn encode_utf16(text: &str, to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&to_bytes(unit));
    }
    out
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let mut units = Vec::with_capacity(bytes.len());
    let mut chunks = bytes.chunks_exact(2);
    for pair in chunks.by_ref() {
        if let [hi, lo] = pair {
            units.push(from_bytes([*hi, *lo]));
        }
    }
    // An odd trailing byte cannot form a code unit; surface it as U+FFFD.
    let mut text: String = char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if !chunks.remainder().is_empty() {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for ContentEncoding {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}
