//! CSS selector tokenizer.
//!
//! Whitespace is significant in selectors (it is the descendant
//! combinator), so unlike most tokenizers this one emits it as a token and
//! leaves it to the parser to drop where it is insignificant.
//!
//! The argument of the `:nth-*()` pseudo-classes (`2n+1`, `-n + 3`, `odd`)
//! does not tokenize cleanly with the rest of the grammar; it is captured
//! verbatim as a [`Token::Raw`] and parsed separately.

use std::fmt;

/// An error that occurred while tokenizing or parsing a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssError {
    /// Human-readable error message.
    pub message: String,
    /// 0-based byte offset in the selector where the error occurred.
    pub position: usize,
}

impl fmt::Display for CssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CSS error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for CssError {}

pub(crate) fn make_error(position: usize, message: &str) -> CssError {
    CssError {
        message: message.to_string(),
        position,
    }
}

/// A token produced by the CSS lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An identifier: element name, class name, attribute name or value.
    Ident(String),
    /// An identifier immediately followed by `(`, which is consumed.
    Function(String),
    /// `#name`.
    Hash(String),
    /// A quoted string, without its quotes.
    Literal(String),
    /// Verbatim argument of an `:nth-*()` pseudo-class.
    Raw(String),
    /// One or more whitespace characters.
    Whitespace,
    /// `.`
    Dot,
    /// `*`
    Star,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `)`
    RightParen,
    /// `:`
    Colon,
    /// `::`
    DoubleColon,
    /// `,`
    Comma,
    /// `>`
    Greater,
    /// `+`
    Plus,
    /// `~`
    Tilde,
    /// `=`
    Equal,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `!=`
    NotEqual,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) | Self::Raw(s) => f.write_str(s),
            Self::Function(s) => write!(f, "{s}("),
            Self::Hash(s) => write!(f, "#{s}"),
            Self::Literal(s) => write!(f, "\"{s}\""),
            Self::Whitespace => f.write_str(" "),
            Self::Dot => f.write_str("."),
            Self::Star => f.write_str("*"),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::RightParen => f.write_str(")"),
            Self::Colon => f.write_str(":"),
            Self::DoubleColon => f.write_str("::"),
            Self::Comma => f.write_str(","),
            Self::Greater => f.write_str(">"),
            Self::Plus => f.write_str("+"),
            Self::Tilde => f.write_str("~"),
            Self::Equal => f.write_str("="),
            Self::Includes => f.write_str("~="),
            Self::DashMatch => f.write_str("|="),
            Self::PrefixMatch => f.write_str("^="),
            Self::SuffixMatch => f.write_str("$="),
            Self::SubstringMatch => f.write_str("*="),
            Self::NotEqual => f.write_str("!="),
        }
    }
}

/// CSS selector tokenizer.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte offset into the input.
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole selector, pairing every token with its byte offset.
    ///
    /// # Errors
    ///
    /// Returns [`CssError`] for unterminated strings, stray characters and
    /// unbalanced `:nth-*()` arguments.
    pub fn tokenize(&mut self) -> Result<Vec<(Token, usize)>, CssError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek() {
            let start = self.pos;
            let token = self.next_token(ch)?;
            let captures_argument =
                matches!(&token, Token::Function(name) if name.starts_with("nth-"));
            tokens.push((token, start));
            if captures_argument {
                let arg_start = self.pos;
                tokens.push((self.read_raw_argument()?, arg_start));
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self, ch: char) -> Result<Token, CssError> {
        let start = self.pos;
        match ch {
            c if c.is_whitespace() => {
                self.advance_while(char::is_whitespace);
                Ok(Token::Whitespace)
            }
            '.' => Ok(self.single(Token::Dot)),
            '[' => Ok(self.single(Token::LeftBracket)),
            ']' => Ok(self.single(Token::RightBracket)),
            ')' => Ok(self.single(Token::RightParen)),
            ',' => Ok(self.single(Token::Comma)),
            '>' => Ok(self.single(Token::Greater)),
            '+' => Ok(self.single(Token::Plus)),
            '=' => Ok(self.single(Token::Equal)),
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    Ok(Token::DoubleColon)
                } else {
                    Ok(Token::Colon)
                }
            }
            '*' => Ok(self.maybe_match(Token::Star, Token::SubstringMatch)),
            '~' => Ok(self.maybe_match(Token::Tilde, Token::Includes)),
            '|' | '^' | '$' | '!' => {
                self.bump();
                if self.peek() != Some('=') {
                    return Err(make_error(start, &format!("expected '=' after '{ch}'")));
                }
                self.bump();
                Ok(match ch {
                    '|' => Token::DashMatch,
                    '^' => Token::PrefixMatch,
                    '$' => Token::SuffixMatch,
                    _ => Token::NotEqual,
                })
            }
            '"' | '\'' => self.read_string(ch),
            '#' => {
                self.bump();
                let name = self.read_name()?;
                if name.is_empty() {
                    return Err(make_error(start, "expected a name after '#'"));
                }
                Ok(Token::Hash(name))
            }
            c if is_name_char(c) || c == '\\' => {
                let name = self.read_name()?;
                if self.peek() == Some('(') {
                    self.bump();
                    Ok(Token::Function(name.to_ascii_lowercase()))
                } else {
                    Ok(Token::Ident(name))
                }
            }
            _ => Err(make_error(start, &format!("unexpected character '{ch}'"))),
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    /// `plain`, or `with_equals` when the character is followed by `=`.
    fn maybe_match(&mut self, plain: Token, with_equals: Token) -> Token {
        self.bump();
        if self.peek() == Some('=') {
            self.bump();
            with_equals
        } else {
            plain
        }
    }

    /// Reads an identifier, resolving backslash escapes of single characters.
    fn read_name(&mut self) -> Result<String, CssError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                let escape = self.pos;
                self.bump();
                let escaped = self
                    .peek()
                    .ok_or_else(|| make_error(escape, "escape at end of selector"))?;
                name.push(escaped);
                self.bump();
            } else if is_name_char(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn read_string(&mut self, quote: char) -> Result<Token, CssError> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(make_error(start, "unterminated string")),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(Token::Literal(value));
                }
                Some('\\') => {
                    self.bump();
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.bump();
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Reads up to (not including) the closing `)` of an `:nth-*()` call.
    fn read_raw_argument(&mut self) -> Result<Token, CssError> {
        let start = self.pos;
        let len = self.input[start..]
            .find(')')
            .ok_or_else(|| make_error(start, "missing ')'"))?;
        self.pos += len;
        Ok(Token::Raw(self.input[start..self.pos].trim().to_string()))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
