//! Error-tolerant HTML loading.
//!
//! HTML is parsed by `scraper` (html5ever), which never fails and always
//! produces a complete tree: missing `html`, `head` and `body` elements are
//! implied, unclosed tags are closed, tag and attribute names are
//! lowercased. The resulting tree is then copied into the same
//! `sxd-document` representation the XML loader produces, so the `XPath`
//! engine sees a single tree model.
//!
//! Only elements, attributes, text and comments are copied. Elements carry
//! no namespace, so `//div` matches HTML `div` elements without any prefix
//! registration.
//!
//! # Examples
//!
//! ```
//! use treematch::html::load_html;
//!
//! let doc = load_html("<p>Hello <b>world</b>").unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(root.name().as_deref(), Some("html"));
//! assert_eq!(root.text_content(), "Hello world");
//! ```

use scraper::{ElementRef, Html};
use sxd_document::{dom, Package};
use tracing::debug;

use crate::error::DocumentParseError;
use crate::parser::{empty_input, ParseMode};
use crate::tree::Document;

/// Parses HTML text into a [`Document`].
///
/// # Errors
///
/// Returns [`DocumentParseError`] when the input is empty or contains only
/// whitespace; any other input yields a tree.
pub fn load_html(text: &str) -> Result<Document, DocumentParseError> {
    if text.trim().is_empty() {
        return Err(empty_input(ParseMode::Html));
    }

    let html = Html::parse_document(text);
    let package = Package::new();
    {
        let doc = package.as_document();
        let root = copy_tree(doc, html.root_element());
        doc.root().append_child(root);
    }
    debug!(bytes = text.len(), "html document loaded");

    Ok(Document::from_package(package, ParseMode::Html))
}

/// Copies the subtree under `source` into `doc` and returns its new root.
///
/// Uses an explicit work list rather than recursion so that pathologically
/// deep markup cannot exhaust the stack.
fn copy_tree<'d>(doc: dom::Document<'d>, source: ElementRef<'_>) -> dom::Element<'d> {
    let root = copy_element(doc, source);
    let mut pending = vec![(root, source)];

    while let Some((target, source)) = pending.pop() {
        for child in source.children() {
            match child.value() {
                scraper::Node::Element(_) => {
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        let element = copy_element(doc, child_ref);
                        target.append_child(element);
                        pending.push((element, child_ref));
                    }
                }
                scraper::Node::Text(text) => target.append_child(doc.create_text(text)),
                scraper::Node::Comment(comment) => target.append_child(doc.create_comment(comment)),
                _ => {}
            }
        }
    }
    root
}

fn copy_element<'d>(doc: dom::Document<'d>, source: ElementRef<'_>) -> dom::Element<'d> {
    let element = doc.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        element.set_attribute_value(name, value);
    }
    element
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::{positional_child, query_all, Namespaces, QueryOutcome};

    fn texts(doc: &Document, xpath: &str) -> Vec<String> {
        match query_all(doc.root(), xpath, &Namespaces::new()).unwrap() {
            QueryOutcome::Nodes(nodes) => nodes.iter().map(|n| n.text_content()).collect(),
            QueryOutcome::Scalar(v) => vec![v.to_string()],
        }
    }

    #[test]
    fn test_implied_structure() {
        let doc = load_html("<ul><li>A</li><li>B</li></ul>").unwrap();
        let html = doc.root_element().unwrap();
        assert_eq!(html.name().as_deref(), Some("html"));
        assert_eq!(positional_child(html, 1).unwrap().name().as_deref(), Some("head"));
        assert_eq!(positional_child(html, 2).unwrap().name().as_deref(), Some("body"));
        assert_eq!(texts(&doc, "//li"), vec!["A", "B"]);
    }

    #[test]
    fn test_unclosed_and_uppercase_tags() {
        let doc = load_html("<UL><LI>one<LI>two</UL>").unwrap();
        assert_eq!(texts(&doc, "//ul/li"), vec!["one", "two"]);
    }

    #[test]
    fn test_attributes_copied() {
        let doc = load_html(r#"<a href="/x" class="btn primary">go</a>"#).unwrap();
        assert_eq!(texts(&doc, "//a/@href"), vec!["/x"]);
        assert_eq!(texts(&doc, "//a[@class='btn primary']"), vec!["go"]);
    }

    #[test]
    fn test_entities_decoded() {
        let doc = load_html("<p>Fish &amp; Chips&nbsp;&copy;</p>").unwrap();
        assert_eq!(texts(&doc, "//p"), vec!["Fish & Chips\u{a0}\u{a9}"]);
    }

    #[test]
    fn test_comments_kept_out_of_text() {
        let doc = load_html("<p>a<!-- hidden -->b</p>").unwrap();
        assert_eq!(texts(&doc, "//p"), vec!["ab"]);
        assert_eq!(texts(&doc, "count(//comment())"), vec!["1"]);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 500;
        let mut input = "<div>".repeat(depth);
        input.push_str("leaf");
        let doc = load_html(&input).unwrap();
        assert_eq!(texts(&doc, "string(//body)"), vec!["leaf"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(load_html("").unwrap_err().mode, ParseMode::Html);
        assert!(load_html(" \n\t").is_err());
    }
}
