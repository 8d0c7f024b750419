//! Node handles.
//!
//! [`Node`] is a copyable handle into a parsed [`Document`](super::Document).
//! Equality is node identity: two distinct `<li>` elements with the same
//! text are different nodes.

use std::fmt;

use sxd_xpath::nodeset;

/// The kind of a document node, corresponding to the `XPath` data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node. There is exactly one per document.
    Root,
    /// An element, e.g. `<div class="x">`.
    Element,
    /// An attribute, as selected by `@name`.
    Attribute,
    /// Character data.
    Text,
    /// A comment, e.g. `<!-- ... -->`.
    Comment,
    /// A processing instruction, e.g. `<?target data?>`.
    ProcessingInstruction,
    /// A namespace node, as selected by the `namespace::` axis.
    Namespace,
}

/// A node of a parsed document.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node<'d>(pub(crate) nodeset::Node<'d>);

impl<'d> Node<'d> {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.0 {
            nodeset::Node::Root(_) => NodeKind::Root,
            nodeset::Node::Element(_) => NodeKind::Element,
            nodeset::Node::Attribute(_) => NodeKind::Attribute,
            nodeset::Node::Text(_) => NodeKind::Text,
            nodeset::Node::Comment(_) => NodeKind::Comment,
            nodeset::Node::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            nodeset::Node::Namespace(_) => NodeKind::Namespace,
        }
    }

    /// The qualified name of elements, attributes and processing
    /// instructions; `None` for the other kinds.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.0.prefixed_name()
    }

    /// The text content of the node: the concatenated descendant text of
    /// elements and of the document, the value of attributes, the data of
    /// text and comment nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.0.string_value()
    }

    /// Value of the attribute `name` of an element.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        match self.0 {
            nodeset::Node::Element(element) => element.attribute_value(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Node<'d>> {
        self.0.parent().map(Node)
    }

    /// Child nodes in document order (elements, text, comments, processing
    /// instructions).
    #[must_use]
    pub fn children(&self) -> Vec<Node<'d>> {
        self.0.children().into_iter().map(Node).collect()
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = Node<'d>> {
        self.0
            .children()
            .into_iter()
            .filter(|child| matches!(child, nodeset::Node::Element(_)))
            .map(Node)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.name()) {
            (NodeKind::Element, Some(name)) => write!(f, "Node(<{name}>)"),
            (NodeKind::Attribute, Some(name)) => write!(f, "Node(@{name})"),
            (kind, _) => write!(f, "Node({kind:?})"),
        }
    }
}

impl<'d> From<nodeset::Node<'d>> for Node<'d> {
    fn from(node: nodeset::Node<'d>) -> Self {
        Self(node)
    }
}
