//! # treematch
//!
//! Declarative extraction of structured data from HTML and XML documents.
//!
//! You describe *what* to extract (selectors, child positions, nested
//! record layouts) and compose those descriptions with combinators; the
//! library runs them against a parsed document and builds a fresh result
//! of strings, numbers, sequences and records.
//!
//! ## Quick Start
//!
//! ```
//! use treematch::{Mapping, Matcher};
//!
//! let html = r#"
//!     <article>
//!       <h1>Release notes</h1>
//!       <a href="/v1">v1</a> <a href="/v2">v2</a>
//!     </article>"#;
//!
//! let page = Matcher::single(
//!     Mapping::new()
//!         .field("title", "//h1")
//!         .field("links", Matcher::multi("//a/@href")),
//! );
//! let json = page.from_html(None).run(html).unwrap();
//! assert_eq!(json["title"], "Release notes");
//! assert_eq!(json["links"], serde_json::json!(["/v1", "/v2"]));
//! ```
//!
//! ## Modules
//!
//! - [`matcher`]: matchers, combinators, path descriptions, contexts and
//!   extractors.
//! - [`css`]: CSS selector to `XPath` translation, used by [`Context::css`].
//! - [`tree`], [`parser`], [`html`], [`encoding`]: document loading and
//!   the query surface the matchers run on.
//! - [`value`]: result values.

pub mod css;
pub mod encoding;
pub mod error;
pub mod html;
pub mod matcher;
pub mod parser;
pub mod tree;
pub mod value;

pub use error::{DocumentParseError, Error, Result};
pub use matcher::{extract, Context, DocumentMatcher, Extractor, MapKey, Mapping, Matcher, PathSpec};
pub use parser::ParseMode;
pub use tree::{Document, Node, NodeKind};
pub use value::{Record, Value};
