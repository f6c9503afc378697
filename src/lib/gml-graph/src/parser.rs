/*!
A recursive-descent parser that turns GML tokens into a tree of key-value items.

```text
block := (key value)*
value := NUMBER | STRING | '[' block ']'
```

No key is special at this level; `graph`, `node` and `edge` are interpreted by the graph builder.
Repeated keys are kept as separate items.
*/

use std::borrow::Cow;

use log::*;

use crate::error::{Error, SyntaxErrorKind};
use crate::gml::Value;
use crate::options::ParserOptions;
use crate::token::{self, Token, TokenKind};

/// A key-value pair and the position of its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<'a> {
    pub key: &'a str,
    /// Byte offset of the key.
    pub offset: usize,
    pub value: ItemValue<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue<'a> {
    /// A number or string.
    Scalar(Value<'a>),
    /// A nested `[ ... ]` block. `offset` is the byte offset of its `[`.
    Block { offset: usize, items: Vec<Item<'a>> },
}

impl<'a> ItemValue<'a> {
    /// Drop the source positions, turning nested blocks into [`Value::List`]s.
    pub fn into_value(self) -> Value<'a> {
        match self {
            Self::Scalar(value) => value,
            Self::Block { items, .. } => Value::List(
                items
                    .into_iter()
                    .map(|item| (Cow::Borrowed(item.key), item.value.into_value()))
                    .collect(),
            ),
        }
    }
}

/// Tokenize and parse a whole document into its outermost block.
pub fn parse_items<'a>(input: &'a str, options: &ParserOptions) -> Result<Vec<Item<'a>>, Error> {
    let tokens = token::tokenize(input)?;
    parse_tokens(input, tokens, options.max_depth)
}

/// Parse the tokens of `source` into its outermost block.
pub fn parse_tokens<'a>(
    source: &'a str,
    tokens: Vec<Token<'a>>,
    max_depth: usize,
) -> Result<Vec<Item<'a>>, Error> {
    let mut parser = BlockParser {
        source,
        tokens: tokens.into_iter(),
        max_depth,
    };
    let items = parser.block(None, 0)?;
    debug!("Parsed {} top-level items", items.len());
    Ok(items)
}

struct BlockParser<'a> {
    source: &'a str,
    tokens: std::vec::IntoIter<Token<'a>>,
    max_depth: usize,
}

impl<'a> BlockParser<'a> {
    /// Parse items until the `]` matching the bracket at `open`, or until the end of input if this
    /// is the outermost block.
    fn block(&mut self, open: Option<usize>, depth: usize) -> Result<Vec<Item<'a>>, Error> {
        let mut items = Vec::new();

        loop {
            let Some(token) = self.tokens.next() else {
                return match open {
                    None => Ok(items),
                    Some(offset) => Err(self.error(offset, SyntaxErrorKind::UnclosedBracket)),
                };
            };

            let key = match token.kind {
                TokenKind::Key(key) => key,
                TokenKind::CloseBracket => {
                    return match open {
                        Some(_) => Ok(items),
                        None => Err(self.error(token.offset, SyntaxErrorKind::UnmatchedClose)),
                    };
                }
                _ => return Err(self.unexpected(&token, "a key")),
            };

            if !is_valid_key(key) {
                return Err(self.error(token.offset, SyntaxErrorKind::InvalidKey(key.to_string())));
            }

            let value = self.value(depth)?;
            items.push(Item {
                key,
                offset: token.offset,
                value,
            });
        }
    }

    fn value(&mut self, depth: usize) -> Result<ItemValue<'a>, Error> {
        let Some(token) = self.tokens.next() else {
            return Err(self.error(
                self.source.len(),
                SyntaxErrorKind::UnexpectedEof {
                    expected: "a value",
                },
            ));
        };

        match token.kind {
            TokenKind::Int(x) => Ok(ItemValue::Scalar(Value::Int(x))),
            TokenKind::Float(x) => Ok(ItemValue::Scalar(Value::Float(x))),
            TokenKind::Str(s) => Ok(ItemValue::Scalar(Value::Str(s))),
            TokenKind::OpenBracket => {
                if depth >= self.max_depth {
                    return Err(self.error(
                        token.offset,
                        SyntaxErrorKind::NestingTooDeep {
                            max_depth: self.max_depth,
                        },
                    ));
                }
                let items = self.block(Some(token.offset), depth + 1)?;
                Ok(ItemValue::Block {
                    offset: token.offset,
                    items,
                })
            }
            TokenKind::Key(_) | TokenKind::CloseBracket => Err(self.unexpected(&token, "a value")),
        }
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> Error {
        self.error(
            token.offset,
            SyntaxErrorKind::UnexpectedToken {
                expected,
                found: token.to_string(),
            },
        )
    }

    fn error(&self, offset: usize, kind: SyntaxErrorKind) -> Error {
        Error::syntax(self.source, offset, kind)
    }
}

/// A key starts with a character in `[a-zA-Z_]` and has remaining characters in `[a-zA-Z0-9_]`.
fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
