//! Parsed documents and the query surface the matcher engine consumes.
//!
//! A [`Document`] owns an `sxd-document` package. Both HTML and XML input end
//! up in the same tree representation, so every selector runs through the
//! same `XPath` 1.0 engine (`sxd-xpath`) whatever the source format.
//!
//! The engine only needs three operations from this module:
//!
//! - [`query_all`]: run a selector against a node with namespace bindings;
//! - [`positional_child`]: the n-th child element of a node;
//! - [`Node::text_content`]: the text an extractor starts from.

mod node;

pub use node::{Node, NodeKind};

use std::fmt;

use indexmap::IndexMap;
use sxd_document::Package;
use sxd_xpath::{Factory, Value as XPathValue};
use tracing::trace;

use crate::error::{DocumentParseError, Error, Result};
use crate::parser::ParseMode;
use crate::value::Value;

/// Namespace bindings registered before a query runs: prefix → URI.
pub type Namespaces = IndexMap<String, String>;

/// A parsed HTML or XML document.
///
/// # Examples
///
/// ```
/// use treematch::Document;
///
/// let doc = Document::parse_xml("<root><child>Hello</child></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(root.name().as_deref(), Some("root"));
/// assert_eq!(root.text_content(), "Hello");
/// ```
pub struct Document {
    package: Package,
    mode: ParseMode,
}

impl Document {
    pub(crate) fn from_package(package: Package, mode: ParseMode) -> Self {
        Self { package, mode }
    }

    /// Parses already-decoded HTML text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentParseError`] for empty input.
    pub fn parse_html(text: &str) -> Result<Self, DocumentParseError> {
        crate::html::load_html(text)
    }

    /// Parses already-decoded XML text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentParseError`] for empty or malformed input.
    pub fn parse_xml(text: &str) -> Result<Self, DocumentParseError> {
        crate::parser::load_xml(text)
    }

    /// The document node, parent of the root element.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node(self.package.as_document().root().into())
    }

    /// The outermost element (`<html>` for HTML input).
    #[must_use]
    pub fn root_element(&self) -> Option<Node<'_>> {
        self.root().child_elements().next()
    }

    /// The parser that produced this document.
    #[must_use]
    pub fn mode(&self) -> ParseMode {
        self.mode
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("mode", &self.mode)
            .field("root_element", &self.root_element())
            .finish()
    }
}

/// What one selector query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<'d> {
    /// Matched nodes, in document order.
    Nodes(Vec<Node<'d>>),
    /// The result of an aggregate expression such as `count(//li)`.
    Scalar(Value<'d>),
}

/// Evaluates the `XPath` expression `xpath` with `node` as context node.
///
/// Node-set results come back in document order; numbers, strings and
/// booleans come back as [`QueryOutcome::Scalar`].
///
/// # Errors
///
/// Returns [`Error::InvalidSelector`] if the expression does not compile or
/// fails during evaluation (for example an unbound namespace prefix).
pub fn query_all<'d>(node: Node<'d>, xpath: &str, namespaces: &Namespaces) -> Result<QueryOutcome<'d>> {
    let compiled = Factory::new()
        .build(xpath)
        .map_err(|e| Error::invalid_selector(xpath, e))?
        .ok_or_else(|| Error::invalid_selector(xpath, "empty expression"))?;

    let mut context = sxd_xpath::Context::new();
    for (prefix, uri) in namespaces {
        context.set_namespace(prefix, uri);
    }

    let outcome = match compiled
        .evaluate(&context, node.0)
        .map_err(|e| Error::invalid_selector(xpath, e))?
    {
        XPathValue::Nodeset(nodes) => {
            QueryOutcome::Nodes(nodes.document_order().into_iter().map(Node).collect())
        }
        XPathValue::Number(n) => QueryOutcome::Scalar(Value::Float(n)),
        XPathValue::String(s) => QueryOutcome::Scalar(Value::String(s)),
        XPathValue::Boolean(b) => QueryOutcome::Scalar(Value::Bool(b)),
    };

    trace!(
        xpath,
        matched = match &outcome {
            QueryOutcome::Nodes(nodes) => nodes.len(),
            QueryOutcome::Scalar(_) => 1,
        },
        "selector evaluated"
    );
    Ok(outcome)
}

/// The `index`-th (1-based) child element of `node`, like the selector `*[index]`.
///
/// Returns `None` for indices below 1, past the last child, or for nodes
/// that cannot have children.
#[must_use]
pub fn positional_child(node: Node<'_>, index: i64) -> Option<Node<'_>> {
    let skip = usize::try_from(index).ok()?.checked_sub(1)?;
    node.child_elements().nth(skip)
}
