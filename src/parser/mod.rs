//! Document loading.
//!
//! [`parse`] is the single entry point from raw bytes: it decodes the input
//! (see [`crate::encoding`]) and hands the text to the XML loader below or to
//! the HTML loader in [`crate::html`]. XML parsing itself is delegated to
//! `sxd-document`; this module only adds the empty-input check, error
//! mapping shared by both formats, and removal of the prolog's document type
//! declaration, which `sxd-document` cannot read when it has a `PUBLIC`
//! identifier.

use std::borrow::Cow;
use std::fmt;

use tracing::debug;

use crate::encoding::decode_to_utf8;
use crate::error::{DocumentParseError, Result};
use crate::tree::Document;

/// Which markup dialect the input is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseMode {
    /// Error-tolerant HTML, parsed the way browsers do.
    #[default]
    Html,
    /// Well-formed XML.
    Xml,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("HTML"),
            Self::Xml => f.write_str("XML"),
        }
    }
}

/// Decodes and parses a document.
///
/// # Errors
///
/// Returns [`Error::Encoding`](crate::Error::Encoding) if the bytes cannot be
/// decoded, and [`Error::DocumentParse`](crate::Error::DocumentParse) for
/// empty or malformed input.
///
/// # Examples
///
/// ```
/// use treematch::parser::{parse, ParseMode};
///
/// let doc = parse(b"<ul><li>A</li></ul>", ParseMode::Html).unwrap();
/// assert_eq!(doc.root_element().unwrap().name().as_deref(), Some("html"));
///
/// assert!(parse(b"", ParseMode::Xml).is_err());
/// ```
pub fn parse(content: &[u8], mode: ParseMode) -> Result<Document> {
    if content.is_empty() {
        return Err(empty_input(mode).into());
    }
    let text = decode_to_utf8(content, mode)?;
    debug!(%mode, bytes = content.len(), "loading document");
    let doc = match mode {
        ParseMode::Html => crate::html::load_html(&text)?,
        ParseMode::Xml => load_xml(&text)?,
    };
    Ok(doc)
}

/// Parses decoded XML text with `sxd-document`.
pub(crate) fn load_xml(text: &str) -> Result<Document, DocumentParseError> {
    if text.trim().is_empty() {
        return Err(empty_input(ParseMode::Xml));
    }
    let package = sxd_document::parser::parse(&strip_doctype(text))
        .map_err(|e| DocumentParseError::new(ParseMode::Xml, e.to_string()))?;
    Ok(Document::from_package(package, ParseMode::Xml))
}

/// Removes the `<!DOCTYPE ...>` declaration from the prolog, if any.
fn strip_doctype(text: &str) -> Cow<'_, str> {
    let Some(start) = prolog_doctype(text) else {
        return Cow::Borrowed(text);
    };
    let Some(len) = doctype_len(&text[start..]) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() - len);
    out.push_str(&text[..start]);
    out.push_str(&text[start + len..]);
    Cow::Owned(out)
}

/// Offset of a `<!DOCTYPE` that precedes the root element, skipping the XML
/// declaration, processing instructions and comments.
fn prolog_doctype(text: &str) -> Option<usize> {
    let mut pos = 0;
    loop {
        let at = pos + text[pos..].find('<')?;
        let tail = &text[at..];
        if tail.starts_with("<!DOCTYPE") {
            return Some(at);
        }
        let close = if tail.starts_with("<?") {
            "?>"
        } else if tail.starts_with("<!--") {
            "-->"
        } else {
            return None;
        };
        pos = at + tail.find(close)? + close.len();
    }
}

/// Length of the declaration at the start of `decl`, internal subset and
/// quoted identifiers included. `None` if it is never closed.
fn doctype_len(decl: &str) -> Option<usize> {
    let mut quote = None;
    let mut depth = 0usize;
    for (i, c) in decl.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}

pub(crate) fn empty_input(mode: ParseMode) -> DocumentParseError {
    DocumentParseError::new(mode, "empty string")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_parse_xml() {
        let doc = parse(b"<?xml version=\"1.0\"?><root><a>1</a></root>", ParseMode::Xml).unwrap();
        assert_eq!(doc.mode(), ParseMode::Xml);
        assert_eq!(doc.root_element().unwrap().text_content(), "1");
    }

    #[test]
    fn test_parse_empty_input() {
        for mode in [ParseMode::Html, ParseMode::Xml] {
            let err = parse(b"", mode).unwrap_err();
            assert!(matches!(err, Error::DocumentParse(ref e) if e.mode == mode));
        }
    }

    #[test]
    fn test_parse_blank_xml() {
        let err = parse(b"  \n ", ParseMode::Xml).unwrap_err();
        assert!(matches!(err, Error::DocumentParse(_)));
    }

    #[test]
    fn test_parse_malformed_xml() {
        let err = parse(b"<root><a></root>", ParseMode::Xml).unwrap_err();
        match err {
            Error::DocumentParse(e) => assert_eq!(e.mode, ParseMode::Xml),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_latin1_xml() {
        let mut bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>".to_vec();
        bytes.extend_from_slice(b"<r>caf\xE9</r>");
        let doc = parse(&bytes, ParseMode::Xml).unwrap();
        assert_eq!(doc.root_element().unwrap().text_content(), "caf\u{e9}");
    }

    #[test]
    fn test_parse_xhtml_public_doctype() {
        let xhtml = br#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Page</title></head><body><p>Hi</p></body></html>"#;
        let doc = parse(xhtml, ParseMode::Xml).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.name().as_deref(), Some("html"));
        assert_eq!(root.text_content(), "PageHi");
    }

    #[test]
    fn test_strip_doctype_after_prolog() {
        let text = "<?xml version=\"1.0\"?>\n<!-- c -->\n<!DOCTYPE r [<!ELEMENT r (#PCDATA)> <!ATTLIST r a CDATA \">\">]><r>x</r>";
        assert_eq!(
            strip_doctype(text),
            "<?xml version=\"1.0\"?>\n<!-- c -->\n<r>x</r>"
        );
        assert!(matches!(strip_doctype("<r>x</r>"), Cow::Borrowed(_)));
        assert!(matches!(strip_doctype("<r><!DOCTYPE x></r>"), Cow::Borrowed(_)));
        assert!(matches!(strip_doctype("<!DOCTYPE x"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_parse_mode_display() {
        assert_eq!(ParseMode::Html.to_string(), "HTML");
        assert_eq!(ParseMode::Xml.to_string(), "XML");
    }
}
