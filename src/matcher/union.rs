//! Order-preserving union of two selector matchers.

use std::collections::HashMap;

use super::path::queryable;
use super::{Context, Extractor, Matcher, PathSpec};
use crate::error::{Error, Result};
use crate::tree::{query_all, Node, QueryOutcome};
use crate::value::Value;

impl Matcher {
    /// Merges the matches of two selector matchers into one sequence in
    /// document order.
    ///
    /// Each element keeps the value its own matcher extracted for it; a node
    /// matched by both operands takes the value from `self`.
    ///
    /// ```
    /// use treematch::{Document, Matcher, Value};
    ///
    /// let doc = Document::parse_html("<h2>B</h2><h1>A</h1><h2>C</h2>").unwrap();
    /// let headings = Matcher::multi("//h1").seq_or(&Matcher::multi("//h2")).unwrap();
    /// assert_eq!(headings.invoke(doc.root(), None).unwrap(), Value::from(vec!["B", "A", "C"]));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] unless both matchers were
    /// built directly from a selector with [`single`](Matcher::single) or
    /// [`multi`](Matcher::multi).
    pub fn seq_or(&self, other: &Matcher) -> Result<Matcher> {
        let (left, right) = match (self.origin(), other.origin()) {
            (Some(PathSpec::Selector(a)), Some(PathSpec::Selector(b))) => (a.clone(), b.clone()),
            (a, b) => {
                return Err(Error::unsupported(
                    "seq_or",
                    format!(
                        "both operands must be plain selector matchers, got {} and {}",
                        a.map_or("a function", PathSpec::kind),
                        b.map_or("a function", PathSpec::kind),
                    ),
                ))
            }
        };
        let (first, second) = (self.clone(), other.clone());

        Ok(Matcher::new(None, move |input, ctx| {
            if input.is_null() {
                return Ok(Value::List(Vec::new()));
            }
            let node = queryable(input)?;
            let union = format!("{} | {}", ctx.translate(&left)?, ctx.translate(&right)?);
            let ordered = match query_all(node, &union, ctx.namespaces())? {
                QueryOutcome::Nodes(nodes) => nodes,
                QueryOutcome::Scalar(value) => {
                    return Err(Error::unsupported(
                        "seq_or",
                        format!("selectors must select nodes, got {}", value.kind()),
                    ))
                }
            };

            let raw_ctx = ctx.with_extractor(Extractor::Identity);
            let mut sources = operand_nodes(&first, input, &raw_ctx)?;
            sources.extend(operand_nodes(&second, input, &raw_ctx)?);
            let mut values = first.eval(input, ctx)?.into_items();
            values.extend(second.eval(input, ctx)?.into_items());

            let mut first_seen: HashMap<Node<'_>, usize> = HashMap::with_capacity(sources.len());
            for (i, source) in sources.into_iter().enumerate() {
                first_seen.entry(source).or_insert(i);
            }

            Ok(ordered
                .iter()
                .map(|node| {
                    first_seen
                        .get(node)
                        .and_then(|&i| values.get(i).cloned())
                        .unwrap_or_default()
                })
                .collect())
        }))
    }
}

/// The nodes an operand matches, in the order its values come out.
fn operand_nodes<'d>(matcher: &Matcher, input: &Value<'d>, raw_ctx: &Context) -> Result<Vec<Node<'d>>> {
    matcher
        .eval(input, raw_ctx)?
        .into_items()
        .into_iter()
        .map(|item| {
            item.as_node().ok_or_else(|| {
                Error::unsupported("seq_or", format!("operand produced a {}, not a node", item.kind()))
            })
        })
        .collect()
}
