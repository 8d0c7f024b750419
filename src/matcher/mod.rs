//! Matchers: composable extraction functions.
//!
//! A [`Matcher`] is an immutable function `(input, context) → value`. Matchers
//! are built from [`PathSpec`]s with [`Matcher::single`] and
//! [`Matcher::multi`], then refined with combinators that each return a new
//! matcher:
//!
//! ```
//! use treematch::{Document, Mapping, Matcher, Value};
//!
//! let html = r#"
//!     <ul class="products">
//!       <li><b>Apple</b> <i>1.20</i></li>
//!       <li><b>Pear</b> <i>0.95</i></li>
//!     </ul>"#;
//! let doc = Document::parse_html(html).unwrap();
//!
//! let products = Matcher::multi_each(
//!     "//ul[@class='products']/li",
//!     Mapping::new()
//!         .field("name", "b")
//!         .field("price", Matcher::single("i").as_float()),
//! );
//! let value = products.invoke(doc.root(), None).unwrap();
//! let first = value.as_list().unwrap()[0].as_record().unwrap();
//! assert_eq!(first["name"], "Apple");
//! assert_eq!(first["price"], Value::Float(1.2));
//! ```
//!
//! Extraction happens at the leaves. Combinators that need the structure
//! behind a result ([`then`](Matcher::then), [`map_raw`](Matcher::map_raw),
//! [`flat_map`](Matcher::flat_map)) evaluate their inner matcher under the
//! identity extractor and extract only at the end of the chain.

mod context;
pub mod extract;
mod path;
mod union;

pub use context::Context;
pub use extract::{Extractor, UnknownExtractor};
pub use path::{eval_path, extract_paths, MapKey, Mapping, PathSpec};

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::parser::ParseMode;
use crate::tree::{Document, Node, QueryOutcome};
use crate::value::{Record, Value};
use path::queryable;

type EvalFn = dyn for<'d> Fn(&Value<'d>, &Context) -> Result<Value<'d>> + Send + Sync;

/// An immutable, thread-safe extraction function.
///
/// Cloning a matcher is cheap; clones share the same function.
#[derive(Clone)]
pub struct Matcher {
    eval: Arc<EvalFn>,
    origin: Option<Arc<PathSpec>>,
}

impl Matcher {
    fn new<F>(origin: Option<PathSpec>, f: F) -> Self
    where
        F: for<'d> Fn(&Value<'d>, &Context) -> Result<Value<'d>> + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(f),
            origin: origin.map(Arc::new),
        }
    }

    /// A matcher derived from `self`; its origin records the parent.
    fn derive<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(&Value<'d>, &Context) -> Result<Value<'d>> + Send + Sync + 'static,
    {
        Self::new(Some(PathSpec::Combinator(self.clone())), f)
    }

    /// The path description this matcher was built from, if any.
    ///
    /// Plain [`single`](Self::single) and [`multi`](Self::multi) matchers
    /// keep their selector; combinators record their parent matcher.
    #[must_use]
    pub fn origin(&self) -> Option<&PathSpec> {
        self.origin.as_deref()
    }

    /// Wraps a user function as a matcher.
    ///
    /// ```
    /// use treematch::{Context, Matcher, Value};
    ///
    /// let kind = Matcher::from_fn(|input, _ctx| Ok(Value::from(input.kind())));
    /// assert_eq!(kind.eval(&Value::Int(1), &Context::new()).unwrap(), "integer");
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: for<'d> Fn(&Value<'d>, &Context) -> Result<Value<'d>> + Send + Sync + 'static,
    {
        Self::new(None, f)
    }

    /// A matcher that ignores its input and yields `value`.
    #[must_use]
    pub fn constant(value: impl Into<serde_json::Value>) -> Self {
        let value = value.into();
        Self::new(None, move |_, _| Ok(Value::from(value.clone())))
    }

    /// Evaluates `path` against the input: first match for selectors, child
    /// element for indices, record for mappings.
    ///
    /// ```
    /// use treematch::{Document, Matcher};
    ///
    /// let doc = Document::parse_html("<ul><li>A</li><li>B</li></ul>").unwrap();
    /// assert_eq!(Matcher::single("//li").invoke(doc.root(), None).unwrap(), "A");
    /// ```
    pub fn single(path: impl Into<PathSpec>) -> Self {
        let path = path.into();
        Self::new(Some(path.clone()), move |input, ctx| eval_path(input, &path, ctx))
    }

    /// Composes paths left to right: each one is evaluated against the raw
    /// result of the previous ones.
    ///
    /// ```
    /// use treematch::{Document, Matcher};
    ///
    /// let doc = Document::parse_html("<ul><li>A</li><li><b>B</b></li></ul>").unwrap();
    /// let m = Matcher::chain("//ul", [2.into(), "b".into()]);
    /// assert_eq!(m.invoke(doc.root(), None).unwrap(), "B");
    /// ```
    pub fn chain<I>(first: impl Into<PathSpec>, rest: I) -> Self
    where
        I: IntoIterator<Item = PathSpec>,
    {
        rest.into_iter()
            .fold(Self::single(first), |acc, next| acc.then(next))
    }

    /// Evaluates a selector and extracts every match, in document order.
    ///
    /// Paths other than selectors behave as in [`single`](Self::single).
    ///
    /// ```
    /// use treematch::{Document, Matcher, Value};
    ///
    /// let doc = Document::parse_html("<ul><li>A</li><li>B</li></ul>").unwrap();
    /// let all = Matcher::multi("//li").invoke(doc.root(), None).unwrap();
    /// assert_eq!(all, Value::from(vec!["A", "B"]));
    /// ```
    pub fn multi(path: impl Into<PathSpec>) -> Self {
        match path.into() {
            PathSpec::Selector(selector) => {
                let origin = PathSpec::Selector(selector.clone());
                Self::new(Some(origin), move |input, ctx| {
                    if input.is_null() {
                        return Ok(Value::List(Vec::new()));
                    }
                    let node = queryable(input)?;
                    Ok(match ctx.query_all(node, &selector)? {
                        QueryOutcome::Nodes(nodes) => nodes
                            .into_iter()
                            .map(|n| ctx.extractor().apply(n))
                            .collect(),
                        QueryOutcome::Scalar(value) => value,
                    })
                })
            }
            other => Self::single(other),
        }
    }

    /// For every node matched by `path`, evaluates `next` against it.
    ///
    /// The raw matches are obtained without extraction, so `next` can keep
    /// querying below each of them. Each element is what
    /// [`single(next)`](Self::single) gives on that node: the first match of
    /// a selector. Pass [`multi(next)`](Self::multi) to collect every match
    /// below each node. Keys of record results are preserved; no match
    /// yields an empty sequence.
    ///
    /// ```
    /// use treematch::{Document, Matcher};
    ///
    /// let doc = Document::parse_html("<p><a>1</a><a>2</a></p><p><a>3</a></p>").unwrap();
    /// let first = Matcher::multi_each("//p", "a").invoke(doc.root(), None).unwrap();
    /// assert_eq!(first.to_json(), serde_json::json!(["1", "3"]));
    /// let all = Matcher::multi_each("//p", Matcher::multi("a")).invoke(doc.root(), None).unwrap();
    /// assert_eq!(all.to_json(), serde_json::json!([["1", "2"], ["3"]]));
    /// ```
    pub fn multi_each(path: impl Into<PathSpec>, next: impl Into<PathSpec>) -> Self {
        let next = next.into();
        Self::multi(path).map_raw(move |raw, ctx| match raw {
            Value::Null => Ok(Value::List(Vec::new())),
            collection @ (Value::List(_) | Value::Record(_)) => {
                collection.try_map_items(|item| eval_path(&item, &next, ctx))
            }
            single => Ok(Value::List(vec![eval_path(&single, &next, ctx)?])),
        })
    }

    /// Runs the matcher on the input under `context`.
    ///
    /// # Errors
    ///
    /// Returns whatever the matcher's evaluation raises; see [`Error`].
    pub fn eval<'d>(&self, input: &Value<'d>, context: &Context) -> Result<Value<'d>> {
        (self.eval)(input, context)
    }

    /// Runs the matcher on `root`, with the default context when none is given.
    ///
    /// # Errors
    ///
    /// Returns whatever the matcher's evaluation raises; see [`Error`].
    pub fn invoke<'d>(&self, root: Node<'d>, context: Option<&Context>) -> Result<Value<'d>> {
        match context {
            Some(ctx) => self.eval(&Value::Node(root), ctx),
            None => self.eval(&Value::Node(root), &Context::default()),
        }
    }

    /// Runs the matcher on the document node of `doc`.
    ///
    /// # Errors
    ///
    /// Returns whatever the matcher's evaluation raises; see [`Error`].
    pub fn invoke_document<'d>(&self, doc: &'d Document, context: Option<&Context>) -> Result<Value<'d>> {
        self.invoke(doc.root(), context)
    }

    /// Evaluates `next` against the raw result of `self`.
    pub fn then(&self, next: impl Into<PathSpec>) -> Self {
        let next = next.into();
        self.map_raw(move |raw, ctx| eval_path(&raw, &next, ctx))
    }

    /// Evaluates `self` under the identity extractor and passes the raw
    /// result, with the caller's context, to `f`.
    pub fn map_raw<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(Value<'d>, &Context) -> Result<Value<'d>> + Send + Sync + 'static,
    {
        let inner = self.clone();
        self.derive(move |input, ctx| {
            let raw = inner.eval(input, &ctx.with_extractor(Extractor::Identity))?;
            f(raw, ctx)
        })
    }

    /// Post-processes the result.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(Value<'d>) -> Value<'d> + Send + Sync + 'static,
    {
        let inner = self.clone();
        self.derive(move |input, ctx| Ok(f(inner.eval(input, ctx)?)))
    }

    /// Alias of [`map`](Self::map).
    pub fn and_then<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(Value<'d>) -> Value<'d> + Send + Sync + 'static,
    {
        self.map(f)
    }

    /// Post-processes the result with a fallible function.
    pub fn try_map<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(Value<'d>) -> Result<Value<'d>> + Send + Sync + 'static,
    {
        let inner = self.clone();
        self.derive(move |input, ctx| f(inner.eval(input, ctx)?))
    }

    /// Chooses the next matcher from the raw result of `self`, then runs it on
    /// the original input.
    pub fn flat_map<F>(&self, f: F) -> Self
    where
        F: for<'d> Fn(&Value<'d>) -> Matcher + Send + Sync + 'static,
    {
        let inner = self.clone();
        self.derive(move |input, ctx| {
            let raw = inner.eval(input, &ctx.with_extractor(Extractor::Identity))?;
            f(&raw).eval(input, ctx)
        })
    }

    /// Falls back to `alternative` when `self` yields `Null`, an empty
    /// sequence or an empty record. The alternative is only evaluated then.
    pub fn or_else(&self, alternative: impl Into<PathSpec>) -> Self {
        let alternative = alternative.into();
        let inner = self.clone();
        self.derive(move |input, ctx| {
            let primary = inner.eval(input, ctx)?;
            if primary.is_empty() {
                eval_path(input, &alternative, ctx)
            } else {
                Ok(primary)
            }
        })
    }

    /// Evaluates `self` with `extractor` in place of the context's.
    pub fn with_extractor(&self, extractor: impl Into<Extractor>) -> Self {
        let extractor = extractor.into();
        let inner = self.clone();
        self.derive(move |input, ctx| inner.eval(input, &ctx.with_extractor(extractor.clone())))
    }

    /// Evaluates `self` under `context`, ignoring the caller's.
    pub fn with_context(&self, context: Context) -> Self {
        let inner = self.clone();
        self.derive(move |input, _| inner.eval(input, &context))
    }

    /// Converts the result to integers, element-wise for collections.
    ///
    /// Text is read up to the first character that cannot continue a
    /// number, so `"12 items"` gives `12` and `"n/a"` gives `0`.
    pub fn as_int(&self) -> Self {
        self.map(|value| numeric(value, &Value::Int, &|x| Value::Int(truncate(x))))
    }

    /// Converts the result to floats, element-wise for collections.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Self {
        self.map(|value| numeric(value, &|i| Value::Float(i as f64), &Value::Float))
    }

    /// The first element of a sequence or record result; scalars pass through.
    pub fn first(&self) -> Self {
        self.map(|value| match value {
            Value::List(items) => items.into_iter().next().unwrap_or_default(),
            Value::Record(entries) => entries.into_values().next().unwrap_or_default(),
            other => other,
        })
    }

    /// Applies `pattern` to a text result, or to every text of a collection.
    ///
    /// With named groups the result is a record of group name → capture;
    /// otherwise a sequence of the numbered captures. Groups that did not
    /// participate capture `""`; no match gives an empty collection.
    ///
    /// ```
    /// use treematch::{Document, Matcher, Value};
    ///
    /// let doc = Document::parse_html("<p>Price: 12.50 EUR</p>").unwrap();
    /// let m = Matcher::single("//p").regex(r"(?<amount>[\d.]+) (?<currency>\w+)").unwrap();
    /// let value = m.invoke(doc.root(), None).unwrap();
    /// assert_eq!(value.as_record().unwrap()["currency"], "EUR");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] if `pattern` does not compile. At
    /// evaluation, results other than text (or collections of text) raise
    /// [`Error::UnsupportedOperation`].
    pub fn regex(&self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern)?;
        Ok(self.try_map(move |value| apply_regex(&re, value)))
    }

    /// Whether `path` matches anything.
    pub fn has(path: impl Into<PathSpec>) -> Self {
        Self::multi(path).map(|value| Value::Bool(!value.is_empty()))
    }

    /// Number of matches of `path`.
    pub fn count(path: impl Into<PathSpec>) -> Self {
        Self::multi(path).map(|value| Value::Int(i64::try_from(value.len()).unwrap_or(i64::MAX)))
    }

    /// Packages the matcher to run on HTML text.
    #[must_use]
    pub fn from_html(&self, context: Option<Context>) -> DocumentMatcher {
        DocumentMatcher::new(self.clone(), ParseMode::Html, context)
    }

    /// Packages the matcher to run on XML text.
    #[must_use]
    pub fn from_xml(&self, context: Option<Context>) -> DocumentMatcher {
        DocumentMatcher::new(self.clone(), ParseMode::Xml, context)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin() {
            Some(PathSpec::Combinator(_)) => f.write_str("Matcher(<combinator>)"),
            Some(origin) => f.debug_tuple("Matcher").field(origin).finish(),
            None => f.write_str("Matcher(<fn>)"),
        }
    }
}

/// Converts scalars with `make`; integers go through `int` so they keep
/// full precision.
fn numeric<'d>(
    value: Value<'d>,
    int: &dyn Fn(i64) -> Value<'d>,
    make: &dyn Fn(f64) -> Value<'d>,
) -> Value<'d> {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => int(i64::from(b)),
        Value::Int(i) => int(i),
        Value::Float(x) => make(x),
        Value::String(s) => make(leading_number(&s)),
        Value::Node(node) => make(leading_number(&node.text_content())),
        Value::List(items) => Value::List(items.into_iter().map(|v| numeric(v, int, make)).collect()),
        Value::Record(entries) => Value::Record(
            entries
                .into_iter()
                .map(|(k, v)| (k, numeric(v, int, make)))
                .collect::<Record<'d>>(),
        ),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(x: f64) -> i64 {
    if x.is_nan() {
        0
    } else {
        x.trunc() as i64
    }
}

/// Parses the longest numeric prefix of `text` after leading whitespace:
/// optional sign, digits, fraction and exponent. Returns 0 if there is none.
fn leading_number(text: &str) -> f64 {
    let s = text.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B');
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

fn apply_regex<'d>(re: &Regex, value: Value<'d>) -> Result<Value<'d>> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(text) => Ok(captures(re, &text)),
        collection @ (Value::List(_) | Value::Record(_)) => {
            collection.try_map_items(|item| apply_regex(re, item))
        }
        other => Err(Error::unsupported(
            "regex",
            format!("{} given, expected text or a collection of text", other.kind()),
        )),
    }
}

fn captures<'d>(re: &Regex, text: &str) -> Value<'d> {
    let caps = re.captures(text);
    let capture = |m: Option<regex::Match<'_>>| Value::from(m.map_or("", |m| m.as_str()));
    let names: Vec<&str> = re.capture_names().flatten().collect();

    if names.is_empty() {
        caps.map_or_else(
            || Value::List(Vec::new()),
            |caps| (1..caps.len()).map(|i| capture(caps.get(i))).collect(),
        )
    } else {
        caps.map_or_else(
            || Value::Record(Record::new()),
            |caps| {
                names
                    .iter()
                    .map(|name| ((*name).to_string(), capture(caps.name(name))))
                    .collect()
            },
        )
    }
}

/// A matcher bundled with a parser: text in, JSON out.
///
/// ```
/// use treematch::Matcher;
///
/// let titles = Matcher::multi("//h2").from_html(None);
/// let json = titles.run("<h2>One</h2><h2>Two</h2>").unwrap();
/// assert_eq!(json, serde_json::json!(["One", "Two"]));
/// ```
#[derive(Debug, Clone)]
pub struct DocumentMatcher {
    matcher: Matcher,
    mode: ParseMode,
    context: Context,
}

impl DocumentMatcher {
    fn new(matcher: Matcher, mode: ParseMode, context: Option<Context>) -> Self {
        Self {
            matcher,
            mode,
            context: context.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parses `text` and runs the matcher on the document node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentParse`] for empty or malformed input, and
    /// any error the matcher raises.
    pub fn run(&self, text: &str) -> Result<serde_json::Value> {
        let doc = match self.mode {
            ParseMode::Html => Document::parse_html(text)?,
            ParseMode::Xml => Document::parse_xml(text)?,
        };
        self.run_document(&doc)
    }

    /// Decodes and parses raw bytes, honoring a BOM or declared charset, then
    /// runs the matcher.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`Error::Encoding`] for undecodable input.
    pub fn run_bytes(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        let doc = crate::parser::parse(bytes, self.mode)?;
        self.run_document(&doc)
    }

    fn run_document(&self, doc: &Document) -> Result<serde_json::Value> {
        Ok(self.matcher.invoke(doc.root(), Some(&self.context))?.to_json())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"
        <html><body>
          <h1> Catalogue </h1>
          <ul>
            <li class="item"><a href="/a">Alpha</a> <span>3 left</span></li>
            <li class="item"><a href="/b">Beta</a> <span>none</span></li>
            <li class="item sale"><a href="/c">Gamma</a> <span>12</span></li>
          </ul>
        </body></html>"#;

    fn doc() -> Document {
        Document::parse_html(PAGE).unwrap()
    }

    #[test]
    fn test_single_first_match() {
        let doc = doc();
        assert_eq!(Matcher::single("//li/a").invoke(doc.root(), None).unwrap(), "Alpha");
        assert_eq!(Matcher::single("//h1").invoke(doc.root(), None).unwrap(), "Catalogue");
        assert_eq!(Matcher::single("//table").invoke(doc.root(), None).unwrap(), Value::Null);
    }

    #[test]
    fn test_single_scalar_query() {
        let doc = doc();
        let value = Matcher::single("count(//li)").invoke(doc.root(), None).unwrap();
        assert_eq!(value, Value::Float(3.0));
    }

    #[test]
    fn test_multi_and_empty() {
        let doc = doc();
        let links = Matcher::multi("//li/a").invoke(doc.root(), None).unwrap();
        assert_eq!(links, Value::from(vec!["Alpha", "Beta", "Gamma"]));
        let none = Matcher::multi("//table").invoke(doc.root(), None).unwrap();
        assert_eq!(none, Value::List(vec![]));
    }

    #[test]
    fn test_multi_each_record() {
        let doc = doc();
        let items = Matcher::multi_each(
            "//li",
            Mapping::new().field("name", "a").field("href", "a/@href"),
        )
        .invoke(doc.root(), None)
        .unwrap();
        let expected = json!([
            {"name": "Alpha", "href": "/a"},
            {"name": "Beta", "href": "/b"},
            {"name": "Gamma", "href": "/c"},
        ]);
        assert_eq!(items.to_json(), expected);
    }

    #[test]
    fn test_multi_each_no_match() {
        let doc = doc();
        let value = Matcher::multi_each("//table", "td").invoke(doc.root(), None).unwrap();
        assert_eq!(value, Value::List(vec![]));
    }

    #[test]
    fn test_then_keeps_structure() {
        let doc = doc();
        let m = Matcher::single("//li[3]").then("a/@href");
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "/c");
        let missing = Matcher::single("//li[9]").then("a");
        assert_eq!(missing.invoke(doc.root(), None).unwrap(), Value::Null);
    }

    #[test]
    fn test_chain_with_index() {
        let doc = doc();
        let m = Matcher::chain("//ul", [PathSpec::from(2), "a".into()]);
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "Beta");
    }

    #[test]
    fn test_as_int_and_float() {
        let doc = doc();
        let stock = Matcher::multi("//li/span").as_int().invoke(doc.root(), None).unwrap();
        assert_eq!(stock, Value::List(vec![Value::Int(3), Value::Int(0), Value::Int(12)]));
        let missing = Matcher::single("//table").as_int().invoke(doc.root(), None).unwrap();
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn test_as_int_keeps_large_integers() {
        let big = 9_007_199_254_740_993_i64;
        let m = Matcher::constant(big).as_int();
        assert_eq!(m.eval(&Value::Null, &Context::new()).unwrap(), Value::Int(big));
        let m = Matcher::constant(serde_json::json!([big, true])).as_float();
        assert_eq!(
            m.eval(&Value::Null, &Context::new()).unwrap(),
            Value::List(vec![Value::Float(9_007_199_254_740_992.0), Value::Float(1.0)])
        );
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("  12abc"), 12.0);
        assert_eq!(leading_number("-3.5e2x"), -350.0);
        assert_eq!(leading_number(".5"), 0.5);
        assert_eq!(leading_number("7."), 7.0);
        assert_eq!(leading_number("1e"), 1.0);
        assert_eq!(leading_number("abc"), 0.0);
        assert_eq!(leading_number("-"), 0.0);
        assert_eq!(leading_number(""), 0.0);
    }

    #[test]
    fn test_first() {
        let doc = doc();
        let m = Matcher::multi("//li/a").first();
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "Alpha");
        let none = Matcher::multi("//table").first();
        assert_eq!(none.invoke(doc.root(), None).unwrap(), Value::Null);
    }

    #[test]
    fn test_or_else() {
        let doc = doc();
        let m = Matcher::single("//h2").or_else("//h1");
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "Catalogue");
        let m = Matcher::multi("//h2").or_else(Matcher::constant("none"));
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "none");
        let m = Matcher::single("//h1").or_else("//li");
        assert_eq!(m.invoke(doc.root(), None).unwrap(), "Catalogue");
    }

    #[test]
    fn test_with_extractor_and_custom() {
        let doc = doc();
        let href = Extractor::custom(|node| node.attribute("href").into());
        let m = Matcher::multi("//a").with_extractor(href);
        assert_eq!(m.invoke(doc.root(), None).unwrap(), Value::from(vec!["/a", "/b", "/c"]));
    }

    #[test]
    fn test_with_context_overrides_caller() {
        let doc = doc();
        let css = Matcher::multi("li.sale > a").with_context(Context::css());
        assert_eq!(css.invoke(doc.root(), Some(&Context::new())).unwrap(), Value::from(vec!["Gamma"]));
    }

    #[test]
    fn test_flat_map_selects_matcher() {
        let doc = doc();
        let m = Matcher::single("//ul").flat_map(|raw| {
            if raw.as_node().is_some() {
                Matcher::count("//li")
            } else {
                Matcher::constant(0)
            }
        });
        assert_eq!(m.invoke(doc.root(), None).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_regex_numbered_and_named() {
        let doc = doc();
        let numbered = Matcher::multi("//li/a/@href").regex(r"/(\w)").unwrap();
        assert_eq!(
            numbered.invoke(doc.root(), None).unwrap().to_json(),
            json!([["a"], ["b"], ["c"]])
        );
        let named = Matcher::single("//span").regex(r"(?<n>\d+) (?<what>\w+)").unwrap();
        assert_eq!(named.invoke(doc.root(), None).unwrap().to_json(), json!({"n": "3", "what": "left"}));
    }

    #[test]
    fn test_regex_no_match_and_optional_group() {
        let doc = doc();
        let m = Matcher::single("//h1").regex(r"(\d+)").unwrap();
        assert_eq!(m.invoke(doc.root(), None).unwrap(), Value::List(vec![]));
        let m = Matcher::single("//h1").regex(r"(Cat)(x)?").unwrap();
        assert_eq!(m.invoke(doc.root(), None).unwrap().to_json(), json!(["Cat", ""]));
    }

    #[test]
    fn test_regex_errors() {
        assert!(matches!(Matcher::single("//h1").regex("("), Err(Error::InvalidRegex(_))));
        let doc = doc();
        let err = Matcher::count("//li").regex(r"\d").unwrap().invoke(doc.root(), None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { operation: "regex", .. }));
    }

    #[test]
    fn test_has_and_count() {
        let doc = doc();
        assert_eq!(Matcher::has("//li[@class='item sale']").invoke(doc.root(), None).unwrap(), Value::Bool(true));
        assert_eq!(Matcher::has("//table").invoke(doc.root(), None).unwrap(), Value::Bool(false));
        assert_eq!(Matcher::count("//li").invoke(doc.root(), None).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_from_html_and_from_xml() {
        let json = Matcher::single("//h1").from_html(None).run(PAGE).unwrap();
        assert_eq!(json, json!("Catalogue"));
        let xml = Matcher::multi("//v").as_int().from_xml(None);
        assert_eq!(xml.run("<r><v>1</v><v>2</v></r>").unwrap(), json!([1, 2]));
        assert!(matches!(xml.run(""), Err(Error::DocumentParse(_))));
        assert!(matches!(xml.run("<r>"), Err(Error::DocumentParse(_))));
    }

    #[test]
    fn test_origin() {
        assert!(matches!(Matcher::single("//a").origin(), Some(PathSpec::Selector(s)) if s == "//a"));
        assert!(matches!(Matcher::multi("//a").first().origin(), Some(PathSpec::Combinator(_))));
        assert!(Matcher::constant(1).origin().is_none());
    }

    #[test]
    fn test_matcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher>();
        assert_send_sync::<Context>();
        assert_send_sync::<DocumentMatcher>();
    }
}
