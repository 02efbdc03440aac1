use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{Comparator, ConnectorOp, LiteralKind, Punct, Token, TokenKind},
    error::LexError,
};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?")
        .expect("number pattern compiles")
});

static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:[^"\\]|\\.)*""#).expect("string pattern compiles"));

/// Turns query text into tokens. Offsets are byte offsets into the input.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.position += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Emit a token spanning `len` bytes from the current position.
    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        self.position += len;
        Token::new(kind, &self.input[start..self.position], start)
    }

    fn error(&self, found: char) -> LexError {
        LexError {
            offset: self.position,
            found,
        }
    }

    /// Count how many times `byte` repeats from `offset`, up to `max`.
    fn run_of(&self, offset: usize, byte: u8, max: usize) -> usize {
        (0..max)
            .take_while(|i| self.peek_byte(offset + i) == Some(byte))
            .count()
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        match NUMBER.find(self.rest()) {
            Some(m) => Ok(self.take(TokenKind::Literal(LiteralKind::Number), m.end())),
            None => Err(self.error('-')),
        }
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        match STRING.find(self.rest()) {
            Some(m) => Ok(self.take(TokenKind::Literal(LiteralKind::String), m.end())),
            None => Err(self.error('"')),
        }
    }

    fn read_word(&mut self) -> Token {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();

        // Keywords only count when they span the whole word.
        let kind = match &self.rest()[..len] {
            "AND" => TokenKind::Connector(ConnectorOp::And),
            "OR" => TokenKind::Connector(ConnectorOp::Or),
            "true" => TokenKind::Literal(LiteralKind::True),
            "false" => TokenKind::Literal(LiteralKind::False),
            "null" => TokenKind::Literal(LiteralKind::Null),
            _ => TokenKind::PathSegment,
        };
        self.take(kind, len)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, "", self.position));
        };

        let punct = match ch {
            '(' => Some(Punct::LParen),
            ')' => Some(Punct::RParen),
            '{' => Some(Punct::LBrace),
            '}' => Some(Punct::RBrace),
            '[' => Some(Punct::LBracket),
            ']' => Some(Punct::RBracket),
            ',' => Some(Punct::Comma),
            ':' => Some(Punct::Colon),
            '.' => Some(Punct::Period),
            _ => None,
        };
        if let Some(p) = punct {
            return Ok(self.take(TokenKind::Punct(p), 1));
        }

        match ch {
            '>' | '<' => {
                let or_equal = self.peek_byte(1) == Some(b'=');
                let op = match (ch, or_equal) {
                    ('>', true) => Comparator::GreaterEqual,
                    ('>', false) => Comparator::GreaterThan,
                    (_, true) => Comparator::LessEqual,
                    (_, false) => Comparator::LessThan,
                };
                Ok(self.take(TokenKind::Comparator(op), 1 + usize::from(or_equal)))
            }
            '=' => {
                let len = self.run_of(0, b'=', 3);
                Ok(self.take(TokenKind::Comparator(Comparator::Equal), len))
            }
            '!' => match self.run_of(1, b'=', 2) {
                0 => Err(self.error('!')),
                n => Ok(self.take(TokenKind::Comparator(Comparator::NotEqual), 1 + n)),
            },
            '-' | '0'..='9' => self.read_number(),
            '"' => self.read_string(),
            c if c.is_ascii_alphabetic() => Ok(self.read_word()),
            c => Err(self.error(c)),
        }
    }
}

#[test]
fn test_keywords() {
    let tokens = Lexer::new("AND OR true false null").tokenize().unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Connector(ConnectorOp::And),
            TokenKind::Connector(ConnectorOp::Or),
            TokenKind::Literal(LiteralKind::True),
            TokenKind::Literal(LiteralKind::False),
            TokenKind::Literal(LiteralKind::Null),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_comparison_with_path() {
    let mut lexer = Lexer::new("user.age >= 18");
    assert_eq!(lexer.next_token().unwrap(), Token::new(TokenKind::PathSegment, "user", 0));
    assert_eq!(lexer.next_token().unwrap(), Token::new(TokenKind::Punct(Punct::Period), ".", 4));
    assert_eq!(lexer.next_token().unwrap(), Token::new(TokenKind::PathSegment, "age", 5));
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::new(TokenKind::Comparator(Comparator::GreaterEqual), ">=", 9)
    );
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::new(TokenKind::Literal(LiteralKind::Number), "18", 12)
    );
    assert_eq!(lexer.next_token().unwrap(), Token::new(TokenKind::Eof, "", 14));
}
