//! Path descriptions and their evaluation.
//!
//! A [`PathSpec`] says where a value lives relative to an input node:
//!
//! - a selector (`XPath`, or CSS under [`Context::css`]): first match,
//!   extracted with the context's extractor;
//! - a 1-based index: that child element, extracted;
//! - a [`Matcher`]: invoked on the input;
//! - a mapping: every entry evaluated against the same input and assembled
//!   into a record, with [`MapKey::Merge`] entries spliced in.

use std::fmt;

use super::context::Context;
use super::Matcher;
use crate::error::{Error, Result};
use crate::tree::{positional_child, Node, QueryOutcome};
use crate::value::{Record, Value};

/// A key of a mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// The entry's value is stored under this key.
    Name(String),
    /// The entry's value, a sequence or record, is spliced into the result.
    Merge,
}

impl From<&str> for MapKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for MapKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Declarative description of what to extract.
#[derive(Clone)]
pub enum PathSpec {
    /// Selector string, run relative to the input node.
    Selector(String),
    /// 1-based position among the input's child elements.
    Index(i64),
    /// A matcher invoked on the input.
    Combinator(Matcher),
    /// Ordered entries evaluated against the same input.
    Mapping(Vec<(MapKey, PathSpec)>),
}

impl PathSpec {
    /// Builds a mapping from `(key, path)` pairs.
    ///
    /// ```
    /// use treematch::{MapKey, PathSpec};
    ///
    /// let spec = PathSpec::mapping([
    ///     (MapKey::from("title"), PathSpec::from("//h1")),
    ///     (MapKey::from("first"), PathSpec::from(1)),
    /// ]);
    /// assert!(matches!(spec, PathSpec::Mapping(ref entries) if entries.len() == 2));
    /// ```
    pub fn mapping<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<MapKey>,
        P: Into<PathSpec>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }

    /// Name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Selector(_) => "selector",
            Self::Index(_) => "index",
            Self::Combinator(_) => "combinator",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl fmt::Debug for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Index(i) => f.debug_tuple("Index").field(i).finish(),
            Self::Combinator(_) => f.write_str("Combinator(..)"),
            Self::Mapping(entries) => f.debug_tuple("Mapping").field(entries).finish(),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<i64> for PathSpec {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for PathSpec {
    fn from(index: i32) -> Self {
        Self::Index(index.into())
    }
}

impl From<Matcher> for PathSpec {
    fn from(matcher: Matcher) -> Self {
        Self::Combinator(matcher)
    }
}

impl From<&Matcher> for PathSpec {
    fn from(matcher: &Matcher) -> Self {
        Self::Combinator(matcher.clone())
    }
}

impl From<Mapping> for PathSpec {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping.entries)
    }
}

/// Fluent builder for [`PathSpec::Mapping`].
///
/// ```
/// use treematch::{Document, Mapping, Matcher, Value};
///
/// let doc = Document::parse_html("<h1>Title</h1><a>x</a><a>y</a>").unwrap();
/// let page = Matcher::single(
///     Mapping::new()
///         .field("title", "//h1")
///         .field("links", Matcher::multi("//a")),
/// );
/// let value = page.invoke(doc.root(), None).unwrap();
/// assert_eq!(value.as_record().unwrap()["title"], "Title");
/// assert_eq!(value.as_record().unwrap()["links"], Value::from(vec!["x", "y"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(MapKey, PathSpec)>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry stored under `key`.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, path: impl Into<PathSpec>) -> Self {
        self.entries.push((MapKey::Name(key.into()), path.into()));
        self
    }

    /// Adds an entry whose sequence or record is spliced into the result.
    #[must_use]
    pub fn merge(mut self, path: impl Into<PathSpec>) -> Self {
        self.entries.push((MapKey::Merge, path.into()));
        self
    }
}

impl TryFrom<serde_json::Value> for PathSpec {
    type Error = Error;

    /// Reads a path description from JSON: strings are selectors, integers
    /// are indices, objects are mappings (an empty key or `"..."` marks a
    /// merge entry) and arrays are mappings whose entries are all merged,
    /// so `[multi(a), multi(b)]` concatenates the two sequences.
    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(selector) => Ok(Self::Selector(selector)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Index)
                .ok_or(Error::InvalidPathSpec { actual_kind: "float" }),
            serde_json::Value::Object(entries) => entries
                .into_iter()
                .map(|(key, sub)| {
                    let key = if key.is_empty() || key == "..." {
                        MapKey::Merge
                    } else {
                        MapKey::Name(key)
                    };
                    Ok((key, Self::try_from(sub)?))
                })
                .collect::<Result<_>>()
                .map(Self::Mapping),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|sub| Ok((MapKey::Merge, Self::try_from(sub)?)))
                .collect::<Result<_>>()
                .map(Self::Mapping),
            serde_json::Value::Null => Err(Error::InvalidPathSpec { actual_kind: "null" }),
            serde_json::Value::Bool(_) => Err(Error::InvalidPathSpec { actual_kind: "boolean" }),
        }
    }
}

/// The node a selector or index query runs against.
pub(crate) fn queryable<'d>(input: &Value<'d>) -> Result<Node<'d>> {
    input.as_node().ok_or(Error::Query { kind: input.kind() })
}

/// Evaluates `path` against `input`.
///
/// A `Null` input yields `Null` whatever the path, so a miss early in a
/// chain propagates instead of failing.
///
/// # Errors
///
/// Returns [`Error::Query`] when a selector or index reaches a value that is
/// not a node, plus anything the path's own evaluation raises.
pub fn eval_path<'d>(input: &Value<'d>, path: &PathSpec, ctx: &Context) -> Result<Value<'d>> {
    if input.is_null() {
        return Ok(Value::Null);
    }
    match path {
        PathSpec::Combinator(matcher) => matcher.eval(input, ctx),
        PathSpec::Mapping(entries) => extract_paths(input, entries, ctx),
        PathSpec::Selector(selector) => {
            let node = queryable(input)?;
            Ok(match ctx.query_all(node, selector)? {
                QueryOutcome::Nodes(nodes) => nodes
                    .first()
                    .map_or(Value::Null, |first| ctx.extractor().apply(*first)),
                QueryOutcome::Scalar(value) => value,
            })
        }
        PathSpec::Index(index) => {
            let node = queryable(input)?;
            Ok(positional_child(node, *index).map_or(Value::Null, |child| ctx.extractor().apply(child)))
        }
    }
}

/// Collects mapping results; starts out as a sequence and turns into a
/// record as soon as a named key arrives.
enum Merged<'d> {
    List(Vec<Value<'d>>),
    Record { entries: Record<'d>, next_index: usize },
}

impl<'d> Merged<'d> {
    fn into_record(self) -> Self {
        match self {
            Self::List(items) => {
                let next_index = items.len();
                let entries = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect();
                Self::Record { entries, next_index }
            }
            record => record,
        }
    }

    fn insert(self, key: String, value: Value<'d>) -> Self {
        match self.into_record() {
            Self::Record { mut entries, next_index } => {
                entries.insert(key, value);
                Self::Record { entries, next_index }
            }
            list => list,
        }
    }

    fn push(&mut self, value: Value<'d>) {
        match self {
            Self::List(items) => items.push(value),
            Self::Record { entries, next_index } => {
                entries.insert(next_index.to_string(), value);
                *next_index += 1;
            }
        }
    }

    fn into_value(self) -> Value<'d> {
        match self {
            Self::List(items) => Value::List(items),
            Self::Record { entries, .. } => Value::Record(entries),
        }
    }
}

/// Evaluates every mapping entry against the same input.
///
/// Named entries land under their key. Merge entries must produce a
/// sequence, whose elements are appended positionally, or a record, whose
/// entries overwrite equal keys. The result is a sequence while it only
/// ever received merged sequence elements, a record otherwise.
///
/// # Errors
///
/// Returns [`Error::Merge`] with the entry's position when a merge entry
/// produces anything but a sequence or a record, `Null` included.
pub fn extract_paths<'d>(
    input: &Value<'d>,
    entries: &[(MapKey, PathSpec)],
    ctx: &Context,
) -> Result<Value<'d>> {
    let mut merged = Merged::List(Vec::new());
    for (position, (key, path)) in entries.iter().enumerate() {
        let value = eval_path(input, path, ctx)?;
        merged = match key {
            MapKey::Name(name) => merged.insert(name.clone(), value),
            MapKey::Merge => match value {
                Value::List(items) => {
                    for item in items {
                        merged.push(item);
                    }
                    merged
                }
                Value::Record(record) => record
                    .into_iter()
                    .fold(merged, |acc, (k, v)| acc.insert(k, v)),
                _ => return Err(Error::Merge { key: position }),
            },
        };
    }
    Ok(merged.into_value())
}
