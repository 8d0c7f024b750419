//! CSS selector to `XPath` 1.0 translation.
//!
//! Every selector becomes an expression anchored with
//! `descendant-or-self::`, so it matches the context node itself and
//! everything below it, which is how CSS selectors behave when run
//! relative to an element. Comma groups become `XPath` unions.
//!
//! Element and attribute names are matched case-sensitively; HTML input is
//! already lowercased by the parser.
//!
//! # Examples
//!
//! ```
//! use treematch::css::to_xpath;
//!
//! assert_eq!(
//!     to_xpath("ul > li.item").unwrap(),
//!     "descendant-or-self::ul/li[contains(concat(' ', normalize-space(@class), ' '), ' item ')]"
//! );
//! assert_eq!(to_xpath("a::attr(href)").unwrap(), "descendant-or-self::a/@href");
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::CssError;

use parser::{AttributeOp, Combinator, Compound, Condition, PseudoClass, PseudoElement, Selector};

use tracing::trace;

use crate::error::{Error, Result};

/// Translates a CSS selector into an equivalent `XPath` 1.0 expression.
///
/// # Errors
///
/// Returns [`Error::InvalidSelector`] if the selector does not parse or uses
/// a construct with no `XPath` equivalent here (for example
/// `*:first-of-type`).
pub fn to_xpath(selector: &str) -> Result<String> {
    let group = parser::parse(selector).map_err(|e| Error::invalid_selector(selector, e))?;
    let parts = group
        .0
        .iter()
        .map(render_selector)
        .collect::<std::result::Result<Vec<_>, CssError>>()
        .map_err(|e| Error::invalid_selector(selector, e))?;
    let xpath = parts.join(" | ");
    trace!(selector, xpath, "selector translated");
    Ok(xpath)
}

fn render_selector(selector: &Selector) -> std::result::Result<String, CssError> {
    let mut xpath = String::from("descendant-or-self::");
    xpath.push_str(&render_compound(&selector.head)?);

    for (combinator, compound) in &selector.tail {
        xpath.push_str(match combinator {
            Combinator::Descendant => "//",
            Combinator::Child => "/",
            Combinator::Adjacent => "/following-sibling::*[1]/self::",
            Combinator::Sibling => "/following-sibling::",
        });
        xpath.push_str(&render_compound(compound)?);
    }

    match &selector.pseudo_element {
        Some(PseudoElement::Text) => xpath.push_str("/text()"),
        Some(PseudoElement::Attr(name)) => {
            xpath.push_str("/@");
            xpath.push_str(name);
        }
        None => {}
    }
    Ok(xpath)
}

fn render_compound(compound: &Compound) -> std::result::Result<String, CssError> {
    let element = compound.element.as_deref().unwrap_or("*");
    let conditions = compound
        .conditions
        .iter()
        .map(|c| render_condition(c, compound.element.as_deref()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let conditions: Vec<String> = conditions.into_iter().flatten().collect();

    if conditions.is_empty() {
        Ok(element.to_string())
    } else {
        Ok(format!("{element}[{}]", conditions.join(" and ")))
    }
}

/// Renders one condition as a predicate expression, or `None` when it
/// always holds (`:nth-child(n)`).
fn render_condition(
    condition: &Condition,
    element: Option<&str>,
) -> std::result::Result<Option<String>, CssError> {
    let expr = match condition {
        Condition::Id(id) => format!("@id = {}", literal(id)),
        Condition::Class(class) => contains_word("@class", class),
        Condition::Attribute { name, test } => render_attribute(name, test.as_ref()),
        Condition::Pseudo(pseudo) => match render_pseudo(pseudo, element)? {
            Some(expr) => expr,
            None => return Ok(None),
        },
        Condition::Not(inner) => {
            let mut parts = Vec::new();
            if let Some(name) = &inner.element {
                parts.push(format!("self::{name}"));
            }
            for c in &inner.conditions {
                if let Some(expr) = render_condition(c, inner.element.as_deref().or(element))? {
                    parts.push(expr);
                }
            }
            if parts.is_empty() {
                // :not(*) matches nothing.
                "false()".to_string()
            } else {
                format!("not({})", parts.join(" and "))
            }
        }
    };
    Ok(Some(expr))
}

fn render_attribute(name: &str, test: Option<&(AttributeOp, String)>) -> String {
    let attr = format!("@{name}");
    let Some((op, value)) = test else {
        return attr;
    };
    match op {
        AttributeOp::Equals => format!("{attr} = {}", literal(value)),
        AttributeOp::NotEqual => format!("(not({attr}) or {attr} != {})", literal(value)),
        AttributeOp::Includes => {
            if value.is_empty() || value.contains(char::is_whitespace) {
                "false()".to_string()
            } else {
                contains_word(&attr, value)
            }
        }
        AttributeOp::DashMatch => format!(
            "({attr} = {} or starts-with({attr}, {}))",
            literal(value),
            literal(&format!("{value}-"))
        ),
        _ if value.is_empty() => "false()".to_string(),
        AttributeOp::Prefix => format!("starts-with({attr}, {})", literal(value)),
        AttributeOp::Substring => format!("contains({attr}, {})", literal(value)),
        AttributeOp::Suffix => format!(
            "substring({attr}, string-length({attr}) - {}) = {}",
            value.chars().count() - 1,
            literal(value)
        ),
    }
}

fn render_pseudo(
    pseudo: &PseudoClass,
    element: Option<&str>,
) -> std::result::Result<Option<String>, CssError> {
    let typed = |what: &str| {
        element.ok_or_else(|| CssError {
            message: format!("'*:{what}' needs an element name"),
            position: 0,
        })
    };
    let expr = match pseudo {
        PseudoClass::FirstChild => "count(preceding-sibling::*) = 0".to_string(),
        PseudoClass::LastChild => "count(following-sibling::*) = 0".to_string(),
        PseudoClass::OnlyChild => {
            "count(preceding-sibling::*) = 0 and count(following-sibling::*) = 0".to_string()
        }
        PseudoClass::FirstOfType => {
            format!("count(preceding-sibling::{}) = 0", typed("first-of-type")?)
        }
        PseudoClass::LastOfType => {
            format!("count(following-sibling::{}) = 0", typed("last-of-type")?)
        }
        PseudoClass::OnlyOfType => {
            let name = typed("only-of-type")?;
            format!("count(preceding-sibling::{name}) = 0 and count(following-sibling::{name}) = 0")
        }
        PseudoClass::Empty => "not(*) and not(string-length())".to_string(),
        PseudoClass::Root => "not(parent::*)".to_string(),
        PseudoClass::Contains(text) => format!("contains(string(.), {})", literal(text)),
        PseudoClass::Nth {
            a,
            b,
            from_end,
            of_type,
        } => {
            let axis = if *from_end { "following" } else { "preceding" };
            let test = if *of_type { typed("nth-of-type")? } else { "*" };
            return Ok(render_nth(*a, *b, &format!("count({axis}-sibling::{test}) + 1")));
        }
    };
    Ok(Some(expr))
}

/// Renders `an+b` against the 1-based position expression `position`.
fn render_nth(a: i64, b: i64, position: &str) -> Option<String> {
    if a == 0 {
        return Some(if b < 1 {
            "false()".to_string()
        } else {
            format!("{position} = {b}")
        });
    }
    if a == 1 && b <= 1 {
        return None;
    }

    let offset = match b {
        0 => position.to_string(),
        b if b > 0 => format!("{position} - {b}"),
        b => format!("{position} + {}", -b),
    };
    let step = format!("({offset}) mod {a} = 0");
    if a > 0 && b <= 1 {
        Some(step)
    } else {
        Some(format!("{step} and ({offset}) div {a} >= 0"))
    }
}

/// `word` occurs in the whitespace-separated list held by `attr`.
fn contains_word(attr: &str, word: &str) -> String {
    format!(
        "contains(concat(' ', normalize-space({attr}), ' '), {})",
        literal(&format!(" {word} "))
    )
}

/// Quotes `value` as an `XPath` string literal. `XPath` 1.0 has no escapes,
/// so values containing both quote characters are built with `concat()`.
fn literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|part| format!("'{part}'"))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
