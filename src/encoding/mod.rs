//! Encoding detection and transcoding of raw document bytes.
//!
//! Documents arrive as bytes; the adapters in [`crate::parser`] work on text.
//! This module bridges the two with `encoding_rs`.
//!
//! # Encoding Detection Strategy
//!
//! 1. Check for a Byte Order Mark (BOM) at the start of the input.
//! 2. If the remaining bytes are valid UTF-8, look for a declared charset
//!    (`<?xml encoding=...?>` for XML, `<meta charset>` for HTML) and
//!    re-decode only when it names something other than UTF-8.
//! 3. Otherwise decode with the declared charset, falling back to
//!    `windows-1252` for HTML (what browsers assume) and failing for XML.

use thiserror::Error;
use tracing::debug;

use crate::parser::ParseMode;

/// An error that occurs during encoding detection or transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("encoding error: {message}")]
pub struct EncodingError {
    /// A human-readable description of the encoding error.
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Detects the encoding announced by a Byte Order Mark.
///
/// Returns `(label, bom_len)`; without a BOM the label is `UTF-8` and the
/// length is zero.
///
/// ```
/// use treematch::encoding::detect_bom;
///
/// assert_eq!(detect_bom(b"\xEF\xBB\xBFhello"), ("UTF-8", 3));
/// assert_eq!(detect_bom(b"<root/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_bom(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes `bytes` from the named charset into a UTF-8 `String`.
///
/// # Errors
///
/// Returns [`EncodingError`] if the label is unknown to `encoding_rs` or the
/// input contains byte sequences that are malformed for that charset.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;

    debug!(encoding = encoding.name(), bytes = bytes.len(), "transcoding input");
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok(text.into_owned())
}

/// Decodes raw document bytes into text, sniffing the charset for `mode`.
///
/// # Errors
///
/// Returns [`EncodingError`] when the bytes are invalid for the detected
/// charset or the declared charset is unknown.
///
/// ```
/// use treematch::encoding::decode_to_utf8;
/// use treematch::ParseMode;
///
/// let text = decode_to_utf8(b"<p>caf\xE9</p>", ParseMode::Html).unwrap();
/// assert_eq!(text, "<p>caf\u{e9}</p>");
/// ```
pub fn decode_to_utf8(bytes: &[u8], mode: ParseMode) -> Result<String, EncodingError> {
    let (bom_label, bom_len) = detect_bom(bytes);
    let content = &bytes[bom_len..];

    if bom_label != "UTF-8" {
        return transcode(content, bom_label);
    }

    let declared = declared_charset(content, mode);
    match std::str::from_utf8(content) {
        Ok(text) => match declared {
            Some(label) if !is_utf8_label(&label) && bom_len == 0 => transcode(content, &label),
            _ => Ok(text.to_string()),
        },
        Err(_) => match (declared, mode) {
            (Some(label), _) => transcode(content, &label),
            (None, ParseMode::Html) => transcode(content, "windows-1252"),
            (None, ParseMode::Xml) => Err(EncodingError::new("input is not valid UTF-8")),
        },
    }
}

/// Finds the charset declared inside the document prologue.
///
/// The declaration is required to be ASCII-compatible, so the raw bytes are
/// scanned directly without decoding them first.
fn declared_charset(bytes: &[u8], mode: ParseMode) -> Option<String> {
    let head = &bytes[..bytes.len().min(1024)];
    match mode {
        ParseMode::Xml => {
            if !head.starts_with(b"<?xml") {
                return None;
            }
            let decl_end = find(head, b"?>")?;
            attribute_after(&head[..decl_end], b"encoding")
        }
        ParseMode::Html => {
            let lower = head.to_ascii_lowercase();
            let meta = find(&lower, b"<meta")?;
            let rest = &lower[meta..];
            let charset = find(rest, b"charset")?;
            attribute_after(&rest[charset..], b"charset")
        }
    }
}

/// Reads the value of `name=...` at or after the start of `bytes`, quoted or
/// not (HTML allows `content="text/html; charset=utf-8"`).
fn attribute_after(bytes: &[u8], name: &[u8]) -> Option<String> {
    let pos = find(bytes, name)?;
    let rest = skip_ascii_whitespace(&bytes[pos + name.len()..]);
    let rest = skip_ascii_whitespace(rest.strip_prefix(b"=")?);

    let (value, quote) = match rest.first() {
        Some(&q @ (b'"' | b'\'')) => (&rest[1..], Some(q)),
        _ => (rest, None),
    };
    let end = value
        .iter()
        .position(|&b| match quote {
            Some(q) => b == q,
            None => b.is_ascii_whitespace() || b";\"'>/".contains(&b),
        })
        .unwrap_or(value.len());
    let label = &value[..end];

    if label.is_empty() || !label.iter().all(u8::is_ascii) {
        return None;
    }
    Some(String::from_utf8_lossy(label).into_owned())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    matches!(label.to_ascii_uppercase().as_str(), "UTF-8" | "UTF8")
}
