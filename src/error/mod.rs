//! Error types for document loading and matcher evaluation.
//!
//! Every failure is local to one evaluation: an error aborts the whole
//! [`Matcher::invoke`](crate::Matcher::invoke) call and no partial result is
//! produced. Nothing in the library logs failures; they travel back to the
//! caller through [`Result`].

use std::fmt;

use crate::encoding::EncodingError;
use crate::parser::ParseMode;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned when a markup document cannot be loaded.
///
/// Raised for malformed input and for empty input. It is surfaced to the
/// caller unmodified and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParseError {
    /// Human-readable reason, as reported by the underlying parser.
    pub message: String,
    /// Which parser rejected the input.
    pub mode: ParseMode,
}

impl DocumentParseError {
    pub(crate) fn new(mode: ParseMode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode,
        }
    }
}

impl fmt::Display for DocumentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} document: {}", self.mode, self.message)
    }
}

impl std::error::Error for DocumentParseError {}

/// Everything that can go wrong while loading a document or running a matcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input document is malformed or empty.
    #[error(transparent)]
    DocumentParse(#[from] DocumentParseError),

    /// The input bytes could not be decoded to text.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// An untyped value could not be turned into a path description.
    #[error("invalid path: expected string, integer, array or object, {actual_kind} given")]
    InvalidPathSpec {
        /// Kind of the offending value.
        actual_kind: &'static str,
    },

    /// A merge entry of a mapping produced a scalar or nothing.
    #[error("merged entry at position {key} must produce a sequence or a record")]
    Merge {
        /// Position of the merge entry inside its mapping.
        key: usize,
    },

    /// A combinator was applied to something it cannot handle.
    #[error("`{operation}` is not supported here: {reason}")]
    UnsupportedOperation {
        /// Name of the combinator.
        operation: &'static str,
        /// What was wrong with the input.
        reason: String,
    },

    /// A selector or index query reached a value that is not a tree node.
    #[error("cannot execute query on {kind}: a document node is expected (parse the input with `from_html` or `from_xml` first)")]
    Query {
        /// Kind of the value that reached the query.
        kind: &'static str,
    },

    /// The selector does not compile, fails to execute, or cannot be
    /// translated into the query language.
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector {
        /// The selector as written by the caller.
        selector: String,
        /// Reason reported by the translator or the query engine.
        message: String,
    },

    /// The pattern given to [`Matcher::regex`](crate::Matcher::regex) does not compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

impl Error {
    pub(crate) fn invalid_selector(selector: &str, message: impl fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation,
            reason: reason.into(),
        }
    }
}
