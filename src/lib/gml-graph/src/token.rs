/*!
Splits GML text into tokens.

Tokens are separated by whitespace, except for `[` and `]` which are always tokens of their own.
A bare run of other characters is a number if it is shaped and parses like one, and a key
otherwise.

Quoted strings are read naively: every run of whitespace inside the quotes is replaced by a single
space. `"a   b"` and `"a\tb"` both become `a b`. Documents rely on this, so it must not be "fixed".
*/

use std::borrow::Cow;
use std::fmt;

use log::*;

use crate::error::{Error, TokenizeErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    OpenBracket,
    CloseBracket,
    Key(&'a str),
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// The token's source text, including quotes.
    pub lexeme: &'a str,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::OpenBracket | TokenKind::CloseBracket => write!(f, "`{}`", self.lexeme),
            TokenKind::Key(_) => write!(f, "key `{}`", self.lexeme),
            TokenKind::Int(_) | TokenKind::Float(_) => write!(f, "number `{}`", self.lexeme),
            TokenKind::Str(_) => write!(f, "string {}", self.lexeme),
        }
    }
}

/// An iterator over the tokens of a GML document. Stops after the first error.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn string(&mut self, start: usize) -> Result<Token<'a>, Error> {
        let body_start = start + '"'.len_utf8();
        let Some(len) = self.input[body_start..].find('"') else {
            return Err(Error::tokenize(
                self.input,
                start,
                TokenizeErrorKind::UnterminatedString,
            ));
        };
        let body_end = body_start + len;
        self.pos = body_end + '"'.len_utf8();

        Ok(Token {
            kind: TokenKind::Str(collapse_whitespace(&self.input[body_start..body_end])),
            lexeme: &self.input[start..self.pos],
            offset: start,
        })
    }

    fn bare(&mut self, start: usize) -> Result<Token<'a>, Error> {
        let rest = &self.input[start..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '[' || c == ']')
            .unwrap_or(rest.len());
        let lexeme = &rest[..len];
        self.pos = start + len;

        let kind = if is_number_shaped(lexeme) {
            parse_number(lexeme).ok_or_else(|| {
                Error::tokenize(
                    self.input,
                    start,
                    TokenizeErrorKind::MalformedNumber(lexeme.to_string()),
                )
            })?
        } else {
            TokenKind::Key(lexeme)
        };

        Ok(Token {
            kind,
            lexeme,
            offset: start,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();

        let start = self.pos;
        let first = self.input[start..].chars().next()?;

        let token = match first {
            '[' | ']' => {
                self.pos += 1;
                Ok(Token {
                    kind: if first == '[' {
                        TokenKind::OpenBracket
                    } else {
                        TokenKind::CloseBracket
                    },
                    lexeme: &self.input[start..self.pos],
                    offset: start,
                })
            }
            '"' => self.string(start),
            _ => self.bare(start),
        };

        if token.is_err() {
            // nothing is produced after an error
            self.pos = self.input.len();
        }

        Some(token)
    }
}

/// Tokenize a complete GML document.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, Error> {
    let tokens = Tokenizer::new(input).collect::<Result<Vec<_>, _>>()?;
    debug!(
        "Tokenized {} bytes into {} tokens",
        input.len(),
        tokens.len()
    );
    Ok(tokens)
}

/// Replace every whitespace run with a single space. Borrows when nothing needs replacing.
fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    let mut prev_whitespace = false;
    let needs_collapse = s.chars().any(|c| {
        let collapse = c.is_whitespace() && (c != ' ' || prev_whitespace);
        prev_whitespace = c.is_whitespace();
        collapse
    });

    if !needs_collapse {
        return Cow::Borrowed(s);
    }

    let mut collapsed = String::with_capacity(s.len());
    let mut in_whitespace = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    Cow::Owned(collapsed)
}

/// A lexeme starting with a digit, or with a sign or `.` followed by a digit or `.`, must be a
/// number.
fn is_number_shaped(lexeme: &str) -> bool {
    let mut chars = lexeme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+' | '-' | '.') => matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '.'),
        _ => false,
    }
}

fn parse_number(lexeme: &str) -> Option<TokenKind<'_>> {
    let digits = lexeme
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(lexeme);

    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        // an integer that doesn't fit is malformed rather than silently becoming a float
        return lexeme.parse().ok().map(TokenKind::Int);
    }

    lexeme
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(TokenKind::Float)
}
