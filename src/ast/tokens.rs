use std::fmt;

use crate::ast::{Comparator, ConnectorOp};

/// Literal token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// JSON number
    ///
    /// # Examples
    /// ```text
    /// 0
    /// -12
    /// 3.25e-2
    /// ```
    Number,

    /// Double-quoted string with backslash escapes
    ///
    /// # Examples
    /// ```text
    /// "beta"
    /// "say \"hi\""
    /// ```
    String,

    True,
    False,
    Null,
}

/// Punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    /// Left parenthesis for grouping or function calls
    LParen,
    /// Right parenthesis
    RParen,
    /// Left brace for object literals
    LBrace,
    /// Right brace
    RBrace,
    /// Left bracket for array literals
    LBracket,
    /// Right bracket
    RBracket,
    /// Comma for separating arguments, array elements and object entries
    Comma,
    /// Colon for object literal key-value pairs
    Colon,
    /// Period between path segments
    Period,
}

impl Punct {
    pub fn as_char(self) -> char {
        match self {
            Punct::LParen => '(',
            Punct::RParen => ')',
            Punct::LBrace => '{',
            Punct::RBrace => '}',
            Punct::LBracket => '[',
            Punct::RBracket => ']',
            Punct::Comma => ',',
            Punct::Colon => ':',
            Punct::Period => '.',
        }
    }
}

/// Token category, matched exhaustively by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal(LiteralKind),

    /// Identifier naming one step of a context path
    ///
    /// Starts with an ASCII letter, followed by ASCII letters or digits.
    ///
    /// # Examples
    /// ```text
    /// user
    /// plan2
    /// ```
    PathSegment,

    /// `AND` / `OR`
    Connector(ConnectorOp),

    /// `>`, `>=`, `<`, `<=`, `=`/`==`/`===`, `!=`/`!==`
    Comparator(Comparator),

    Punct(Punct),

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(LiteralKind::Number) => f.write_str("number"),
            TokenKind::Literal(LiteralKind::String) => f.write_str("string"),
            TokenKind::Literal(LiteralKind::True) => f.write_str("'true'"),
            TokenKind::Literal(LiteralKind::False) => f.write_str("'false'"),
            TokenKind::Literal(LiteralKind::Null) => f.write_str("'null'"),
            TokenKind::PathSegment => f.write_str("path segment"),
            TokenKind::Connector(op) => write!(f, "'{}'", op),
            TokenKind::Comparator(op) => write!(f, "'{}'", op),
            TokenKind::Punct(p) => write!(f, "'{}'", p.as_char()),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A lexeme together with its category and byte offset in the query text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            offset,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
