//! CSS selector parser.
//!
//! Recursive descent over the tokens of [`super::lexer::Lexer`], producing
//! a [`SelectorGroup`]. Supported syntax:
//!
//! - type and universal selectors, `#id`, `.class`;
//! - attribute selectors with `=`, `~=`, `|=`, `^=`, `$=`, `*=` and `!=`;
//! - the descendant, `>`, `+` and `~` combinators, and `,` groups;
//! - the structural pseudo-classes (`:first-child`, `:nth-of-type(2n+1)`,
//!   ...), `:empty`, `:root`, `:not(...)` and `:contains("text")`;
//! - the pseudo-elements `::text` and `::attr(name)`, which select text
//!   children and attributes.

use super::lexer::{make_error, CssError, Lexer, Token};

/// Comma-separated alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup(pub Vec<Selector>);

/// One complex selector: compounds joined by combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
    pub pseudo_element: Option<PseudoElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    Sibling,
}

/// An element test with its conditions, e.g. `li.item[data-id]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    /// Element name; `None` for `*` or when omitted.
    pub element: Option<String>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        test: Option<(AttributeOp, String)>,
    },
    Pseudo(PseudoClass),
    Not(Compound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
    NotEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    /// `:nth-child(an+b)` and its three siblings.
    Nth {
        a: i64,
        b: i64,
        from_end: bool,
        of_type: bool,
    },
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {
    /// `::text`
    Text,
    /// `::attr(name)`
    Attr(String),
}

/// Parses a selector group.
///
/// # Errors
///
/// Returns [`CssError`] with the byte offset of the offending token.
pub fn parse(input: &str) -> Result<SelectorGroup, CssError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };

    let mut selectors = vec![parser.parse_selector()?];
    while parser.eat(&Token::Comma) {
        selectors.push(parser.parse_selector()?);
    }
    if let Some(token) = parser.peek() {
        return Err(parser.error(&format!("unexpected '{token}'")));
    }
    Ok(SelectorGroup(selectors))
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    /// Length of the input, reported for errors at end of input.
    end: usize,
}

impl Parser {
    fn parse_selector(&mut self) -> Result<Selector, CssError> {
        self.skip_whitespace();
        let head = self.parse_compound()?;
        let mut tail = Vec::new();
        let mut pseudo_element = None;

        loop {
            if self.peek() == Some(&Token::DoubleColon) {
                self.advance();
                pseudo_element = Some(self.parse_pseudo_element()?);
                self.skip_whitespace();
                break;
            }
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(Token::Comma | Token::RightParen) => break,
                Some(Token::Greater) => Combinator::Child,
                Some(Token::Plus) => Combinator::Adjacent,
                Some(Token::Tilde) => Combinator::Sibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(token) => return Err(self.error(&format!("unexpected '{token}'"))),
            };
            if combinator != Combinator::Descendant {
                self.advance();
                self.skip_whitespace();
            }
            tail.push((combinator, self.parse_compound()?));
        }

        match self.peek() {
            None | Some(Token::Comma) => Ok(Selector {
                head,
                tail,
                pseudo_element,
            }),
            Some(token) => Err(self.error(&format!("unexpected '{token}'"))),
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, CssError> {
        let mut matched = false;
        let element = match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                matched = true;
                Some(name)
            }
            Some(Token::Star) => {
                self.advance();
                matched = true;
                None
            }
            _ => None,
        };

        let mut conditions = Vec::new();
        loop {
            let condition = match self.peek() {
                Some(Token::Hash(id)) => {
                    let id = id.clone();
                    self.advance();
                    Condition::Id(id)
                }
                Some(Token::Dot) => {
                    self.advance();
                    Condition::Class(self.expect_ident("class name")?)
                }
                Some(Token::LeftBracket) => {
                    self.advance();
                    self.parse_attribute()?
                }
                Some(Token::Colon) => {
                    self.advance();
                    self.parse_pseudo_class()?
                }
                _ => break,
            };
            conditions.push(condition);
        }

        if !matched && conditions.is_empty() {
            return Err(match self.peek() {
                Some(token) => self.error(&format!("expected a selector, found '{token}'")),
                None => self.error("expected a selector"),
            });
        }
        Ok(Compound {
            element,
            conditions,
        })
    }

    fn parse_attribute(&mut self) -> Result<Condition, CssError> {
        self.skip_whitespace();
        let name = self.expect_ident("attribute name")?;
        self.skip_whitespace();

        let op = match self.peek() {
            Some(Token::RightBracket) => {
                self.advance();
                return Ok(Condition::Attribute { name, test: None });
            }
            Some(Token::Equal) => AttributeOp::Equals,
            Some(Token::Includes) => AttributeOp::Includes,
            Some(Token::DashMatch) => AttributeOp::DashMatch,
            Some(Token::PrefixMatch) => AttributeOp::Prefix,
            Some(Token::SuffixMatch) => AttributeOp::Suffix,
            Some(Token::SubstringMatch) => AttributeOp::Substring,
            Some(Token::NotEqual) => AttributeOp::NotEqual,
            _ => return Err(self.error("expected an attribute operator or ']'")),
        };
        self.advance();
        self.skip_whitespace();

        let value = match self.peek() {
            Some(Token::Ident(v) | Token::Literal(v)) => v.clone(),
            _ => return Err(self.error("expected an attribute value")),
        };
        self.advance();
        self.skip_whitespace();
        if !self.eat(&Token::RightBracket) {
            return Err(self.error("expected ']'"));
        }
        Ok(Condition::Attribute {
            name,
            test: Some((op, value)),
        })
    }

    fn parse_pseudo_class(&mut self) -> Result<Condition, CssError> {
        let position = self.position();
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.advance();
                let pseudo = match name.to_ascii_lowercase().as_str() {
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "first-of-type" => PseudoClass::FirstOfType,
                    "last-of-type" => PseudoClass::LastOfType,
                    "only-of-type" => PseudoClass::OnlyOfType,
                    "empty" => PseudoClass::Empty,
                    "root" => PseudoClass::Root,
                    _ => return Err(make_error(position, &format!("unsupported pseudo-class ':{name}'"))),
                };
                Ok(Condition::Pseudo(pseudo))
            }
            Some(Token::Function(name)) => {
                self.advance();
                let condition = match name.as_str() {
                    "not" => {
                        self.skip_whitespace();
                        let inner = self.parse_compound()?;
                        self.skip_whitespace();
                        Condition::Not(inner)
                    }
                    "contains" => {
                        self.skip_whitespace();
                        let text = match self.peek() {
                            Some(Token::Literal(s) | Token::Ident(s)) => s.clone(),
                            _ => return Err(self.error("expected text in ':contains()'")),
                        };
                        self.advance();
                        self.skip_whitespace();
                        Condition::Pseudo(PseudoClass::Contains(text))
                    }
                    "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                        let arg_position = self.position();
                        let raw = match self.peek() {
                            Some(Token::Raw(raw)) => raw.clone(),
                            _ => return Err(self.error("expected an argument")),
                        };
                        self.advance();
                        let (a, b) = parse_nth(&raw).ok_or_else(|| {
                            make_error(arg_position, &format!("invalid argument '{raw}'"))
                        })?;
                        Condition::Pseudo(PseudoClass::Nth {
                            a,
                            b,
                            from_end: name.contains("-last-"),
                            of_type: name.ends_with("-of-type"),
                        })
                    }
                    _ => return Err(make_error(position, &format!("unsupported pseudo-class ':{name}()'"))),
                };
                if !self.eat(&Token::RightParen) {
                    return Err(self.error("expected ')'"));
                }
                Ok(condition)
            }
            _ => Err(self.error("expected a pseudo-class name")),
        }
    }

    fn parse_pseudo_element(&mut self) -> Result<PseudoElement, CssError> {
        let position = self.position();
        match self.peek().cloned() {
            Some(Token::Ident(name)) if name.eq_ignore_ascii_case("text") => {
                self.advance();
                Ok(PseudoElement::Text)
            }
            Some(Token::Function(name)) if name == "attr" => {
                self.advance();
                self.skip_whitespace();
                let attribute = self.expect_ident("attribute name")?;
                self.skip_whitespace();
                if !self.eat(&Token::RightParen) {
                    return Err(self.error("expected ')'"));
                }
                Ok(PseudoElement::Attr(attribute))
            }
            Some(token) => Err(make_error(position, &format!("unsupported pseudo-element '::{token}'"))),
            None => Err(self.error("expected a pseudo-element name")),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, CssError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(&format!("expected {what}"))),
        }
    }

    /// Skips whitespace tokens, returning whether there were any.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek() == Some(&Token::Whitespace) {
            self.advance();
        }
        self.pos > start
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, p)| *p)
    }

    fn error(&self, message: &str) -> CssError {
        make_error(self.position(), message)
    }
}

/// Parses the `an+b` micro-syntax, including `odd` and `even`.
fn parse_nth(raw: &str) -> Option<(i64, i64)> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }
    match compact.split_once('n') {
        Some((a, b)) => {
            let a = match a {
                "" | "+" => 1,
                "-" => -1,
                _ => a.parse().ok()?,
            };
            let b = if b.is_empty() {
                0
            } else if b.starts_with(['+', '-']) {
                b.strip_prefix('+').unwrap_or(b).parse().ok()?
            } else {
                return None;
            };
            Some((a, b))
        }
        None => Some((0, compact.strip_prefix('+').unwrap_or(&compact).parse().ok()?)),
    }
}
