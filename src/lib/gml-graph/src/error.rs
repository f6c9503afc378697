/*!
Errors produced while turning GML text into a [`Graph`](crate::gml::Graph).

Every failed parse returns exactly one [`Error`], raised at the point where the problem was first
detected. Parse errors carry the [`Position`] of the offending token or declaration.
*/

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A location in the GML source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

impl Position {
    /// Find the line and column of the byte `offset` within `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The kind of GML declaration a semantic error was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Graph,
    Node,
    Edge,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Graph => "graph",
            Self::Node => "node",
            Self::Edge => "edge",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("malformed number `{0}`")]
    MalformedNumber(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("unexpected end of input, `[` is never closed")]
    UnclosedBracket,
    #[error("unmatched `]`")]
    UnmatchedClose,
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    #[error("blocks are nested deeper than {max_depth} levels")]
    NestingTooDeep { max_depth: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("'{key}' was not provided")]
    MissingAttribute { key: &'static str },
    #[error("'{key}' must be an integer, found {found}")]
    NonInteger { key: &'static str, found: String },
    #[error("'{key}' must only be specified once")]
    DuplicateAttribute { key: &'static str },
    #[error("redefinition of node id {id}")]
    DuplicateNode { id: i64 },
    #[error("expected a block, found {found}")]
    NotABlock { found: String },
    #[error("'{key}' must be inside the 'graph' block")]
    OutsideGraph { key: &'static str },
    #[error("no top-level 'graph' block")]
    MissingGraph,
    #[error("more than one top-level 'graph' block")]
    MultipleGraphs,
}

/// An error returned by [`Parser::parse`](crate::Parser::parse) or [`load`](crate::load).
#[derive(Error, Debug)]
pub enum Error {
    #[error("{position}: tokenize error: {kind}")]
    Tokenize {
        position: Position,
        kind: TokenizeErrorKind,
    },
    #[error("{position}: syntax error: {kind}")]
    Syntax {
        position: Position,
        kind: SyntaxErrorKind,
    },
    #[error("{position}: invalid {declaration} declaration: {kind}")]
    Semantic {
        position: Position,
        declaration: Declaration,
        kind: SemanticErrorKind,
    },
    #[error("could not read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn tokenize(source: &str, offset: usize, kind: TokenizeErrorKind) -> Self {
        Self::Tokenize {
            position: Position::locate(source, offset),
            kind,
        }
    }

    pub(crate) fn syntax(source: &str, offset: usize, kind: SyntaxErrorKind) -> Self {
        Self::Syntax {
            position: Position::locate(source, offset),
            kind,
        }
    }

    pub(crate) fn semantic(
        source: &str,
        offset: usize,
        declaration: Declaration,
        kind: SemanticErrorKind,
    ) -> Self {
        Self::Semantic {
            position: Position::locate(source, offset),
            declaration,
            kind,
        }
    }

    /// Where in the input the error was detected. I/O errors have no position.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Tokenize { position, .. }
            | Self::Syntax { position, .. }
            | Self::Semantic { position, .. } => Some(*position),
            Self::Io { .. } => None,
        }
    }
}
