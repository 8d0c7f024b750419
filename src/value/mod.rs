//! Matcher results.
//!
//! A [`Value`] is a fresh tree built from document nodes: scalars, ordered
//! sequences and ordered records. Raw results (produced under the identity
//! extractor) may still hold [`Node`] handles, which is why the type carries
//! the document lifetime `'d`.
//!
//! Values serialize with `serde`; nodes serialize as their text content, so
//! a result can always be written out as JSON once the document is gone.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::tree::Node;

/// Ordered key → value record.
pub type Record<'d> = IndexMap<String, Value<'d>>;

/// The result of evaluating a matcher.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value<'d> {
    /// No match.
    #[default]
    Null,
    /// Result of a boolean query such as `boolean(//a)`, or of [`has`](crate::Matcher::has).
    Bool(bool),
    /// Integer, as produced by [`as_int`](crate::Matcher::as_int) and
    /// [`count`](crate::Matcher::count).
    Int(i64),
    /// Number returned by an aggregate query (`count(...)`, `sum(...)`) or
    /// by [`as_float`](crate::Matcher::as_float).
    Float(f64),
    /// Extracted text.
    String(String),
    /// A document node, only present when extraction was suppressed.
    Node(Node<'d>),
    /// Ordered sequence.
    List(Vec<Value<'d>>),
    /// Ordered record.
    Record(Record<'d>),
}

impl<'d> Value<'d> {
    /// Name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Node(_) => "node",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Null` and for sequences or records without entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(items) => items.is_empty(),
            Self::Record(entries) => entries.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<Node<'d>> {
        match self {
            Self::Node(node) => Some(*node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value<'d>]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Record<'d>> {
        match self {
            Self::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of elements of a sequence or record; scalars count as one and
    /// `Null` as zero.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::List(items) => items.len(),
            Self::Record(entries) => entries.len(),
            _ => 1,
        }
    }

    /// Flattens the value into a sequence: `Null` is empty, lists and records
    /// yield their elements, anything else is a sequence of one.
    #[must_use]
    pub fn into_items(self) -> Vec<Value<'d>> {
        match self {
            Self::Null => Vec::new(),
            Self::List(items) => items,
            Self::Record(entries) => entries.into_values().collect(),
            other => vec![other],
        }
    }

    /// Applies `f` to every element of a sequence or record, keeping keys.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map_items<F>(self, mut f: F) -> crate::Result<Value<'d>>
    where
        F: FnMut(Value<'d>) -> crate::Result<Value<'d>>,
    {
        Ok(match self {
            Self::List(items) => Self::List(items.into_iter().map(&mut f).collect::<Result<_, _>>()?),
            Self::Record(entries) => Self::Record(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((k, f(v)?)))
                    .collect::<crate::Result<_>>()?,
            ),
            other => f(other)?,
        })
    }

    /// Converts the value into plain JSON, replacing nodes with their text.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Node(node) => serde_json::Value::String(node.text_content()),
            Self::List(items) => items.iter().map(Value::to_json).collect(),
            Self::Record(entries) => entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<serde_json::Map<_, _>>()
                .into(),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Node(node) => serializer.serialize_str(&node.text_content()),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Line rendering: scalars print as-is, `Null` prints nothing, collections
/// print one element per line.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", u8::from(*b)),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Node(node) => f.write_str(&node.text_content()),
            Self::List(items) => write_lines(f, items.iter()),
            Self::Record(entries) => write_lines(f, entries.values()),
        }
    }
}

fn write_lines<'a, 'd: 'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value<'d>>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value<'_> {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<'d> From<Node<'d>> for Value<'d> {
    fn from(node: Node<'d>) -> Self {
        Self::Node(node)
    }
}

impl<'d, T: Into<Value<'d>>> From<Option<T>> for Value<'d> {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<'d, T: Into<Value<'d>>> From<Vec<T>> for Value<'d> {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'d> From<Record<'d>> for Value<'d> {
    fn from(entries: Record<'d>) -> Self {
        Self::Record(entries)
    }
}

impl From<serde_json::Value> for Value<'_> {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(entries) => {
                Self::Record(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl<'d> FromIterator<Value<'d>> for Value<'d> {
    fn from_iter<I: IntoIterator<Item = Value<'d>>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl<'d> FromIterator<(String, Value<'d>)> for Value<'d> {
    fn from_iter<I: IntoIterator<Item = (String, Value<'d>)>>(iter: I) -> Self {
        Self::Record(iter.into_iter().collect())
    }
}

impl PartialEq<str> for Value<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
