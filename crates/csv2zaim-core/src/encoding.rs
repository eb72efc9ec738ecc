//! Text decoding and comment normalization for statement exports
//!
//! Card issuers export statements in Shift_JIS. Some exports also lose the
//! katakana long vowel mark on the way out and write a literal `?` instead,
//! so "ケンタッキー" arrives as "ケンタッキ?".

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// The glyph that corrupted exports replace with `?`
const LONG_VOWEL_MARK: &str = "ー";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encoding of the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEncoding(&'static Encoding);

impl SourceEncoding {
    pub fn shift_jis() -> Self {
        Self(SHIFT_JIS)
    }

    pub fn utf8() -> Self {
        Self(UTF_8)
    }

    /// Look up an encoding by its WHATWG label (`sjis`, `shift_jis`, `utf-8`, ...)
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| Error::Config(format!("Unknown encoding: {}", label)))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode the whole input, failing on any malformed byte sequence
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let bytes = if self.0 == UTF_8 {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };

        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| Error::Decode(format!("malformed {} byte sequence", self.name())))
    }
}

impl Default for SourceEncoding {
    fn default() -> Self {
        Self::shift_jis()
    }
}

/// Repair, fold and trim a free-text statement field
///
/// NFKC folds full-width ASCII to half-width and half-width katakana to
/// full-width, then every `?` (including a folded `？`) becomes a long vowel
/// mark.
pub fn normalize_comment(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    folded.replace('?', LONG_VOWEL_MARK).trim().to_string()
}
