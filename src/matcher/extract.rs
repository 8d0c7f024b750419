//! Extractors: turning a matched node into a value.
//!
//! The three text extractors differ only in how they clean up whitespace:
//!
//! | extractor   | spaces          | newlines                        |
//! |-------------|-----------------|---------------------------------|
//! | `Text`      | runs → one      | kept                            |
//! | `Oneline`   | runs → one      | folded into spaces              |
//! | `Normalize` | runs → one      | line edges trimmed, ≤ 1 blank line |
//!
//! `Identity` suppresses extraction altogether and yields the node itself,
//! which is how raw chaining keeps querying structurally.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::tree::Node;
use crate::value::Value;

type NodeFn = dyn for<'d> Fn(Node<'d>) -> Value<'d> + Send + Sync;

/// A pure function from a matched node to a value.
#[derive(Clone, Default)]
pub enum Extractor {
    /// Text content with runs of spaces collapsed and ends trimmed.
    #[default]
    Text,
    /// Text content on a single line: every whitespace run becomes one space.
    Oneline,
    /// Text content tidied line by line, keeping paragraph breaks.
    Normalize,
    /// The node itself, unextracted.
    Identity,
    /// A user-supplied extractor.
    Custom(Arc<NodeFn>),
}

impl Extractor {
    /// Wraps a user function as an extractor.
    ///
    /// ```
    /// use treematch::{Document, Extractor, Matcher, Context};
    ///
    /// let href = Extractor::custom(|node| node.attribute("href").into());
    /// let doc = Document::parse_html(r#"<a href="/next">more</a>"#).unwrap();
    /// let ctx = Context::new().with_extractor(href);
    /// let value = Matcher::single("//a").invoke(doc.root(), Some(&ctx)).unwrap();
    /// assert_eq!(value, "/next");
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: for<'d> Fn(Node<'d>) -> Value<'d> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Applies the extractor to `node`.
    #[must_use]
    pub fn apply<'d>(&self, node: Node<'d>) -> Value<'d> {
        match self {
            Self::Text => Value::String(to_string(&node.text_content())),
            Self::Oneline => Value::String(oneline(&node.text_content())),
            Self::Normalize => Value::String(normalize(&node.text_content())),
            Self::Identity => Value::Node(node),
            Self::Custom(f) => f(node),
        }
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Oneline => f.write_str("Oneline"),
            Self::Normalize => f.write_str("Normalize"),
            Self::Identity => f.write_str("Identity"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Error returned when parsing an unknown extractor name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown extractor `{0}` (expected text, oneline, normalize or identity)")]
pub struct UnknownExtractor(pub String);

impl FromStr for Extractor {
    type Err = UnknownExtractor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "tostring" => Ok(Self::Text),
            "oneline" => Ok(Self::Oneline),
            "normalize" => Ok(Self::Normalize),
            "identity" | "raw" => Ok(Self::Identity),
            _ => Err(UnknownExtractor(s.to_string())),
        }
    }
}

/// Characters removed from both ends by every text extractor.
fn is_trimmed(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

fn is_horizontal(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Replaces every maximal run of characters matching `pred` with one space.
fn collapse(text: &str, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if pred(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Collapses runs of spaces and tabs to a single space and trims the ends.
///
/// ```
/// assert_eq!(treematch::extract::to_string("  a   b\n c  "), "a b\n c");
/// ```
#[must_use]
pub fn to_string(text: &str) -> String {
    collapse(text, is_horizontal).trim_matches(is_trimmed).to_string()
}

/// Collapses every whitespace run, newlines included, to one space.
///
/// ```
/// assert_eq!(treematch::extract::oneline(" a \n\n b\t"), "a b");
/// ```
#[must_use]
pub fn oneline(text: &str) -> String {
    collapse(text, |c| c.is_ascii_whitespace() || c == '\x0B')
        .trim_matches(is_trimmed)
        .to_string()
}

/// Trims spaces and tabs at both edges of every line, keeps at most one
/// blank line between paragraphs, collapses the remaining space runs and
/// trims the ends.
///
/// ```
/// let text = "  Title \n\n\n\n   first  line\n\tsecond  ";
/// assert_eq!(treematch::extract::normalize(text), "Title\n\nfirst line\nsecond");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped = text
        .split('\n')
        .map(|line| line.trim_matches(is_horizontal))
        .collect::<Vec<_>>()
        .join("\n");

    let mut folded = String::with_capacity(stripped.len());
    let mut newlines = 0;
    for c in stripped.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                folded.push('\n');
            }
        } else {
            newlines = 0;
            folded.push(c);
        }
    }

    collapse(&folded, is_horizontal)
        .trim_matches(is_trimmed)
        .to_string()
}
