use crate::{
    ast::{ConnectorOp, Expr, LiteralKind, Punct, Token, TokenKind},
    error::{ParseError, SyntaxError},
    value::Value,
};

type Parsed<T> = Result<T, SyntaxError>;

/// Deepest nesting of groups, literals, calls, path steps or alternating
/// connectors accepted in one query.
pub const MAX_DEPTH: usize = 32;

/// Recursive-descent parser over a token slice ending in `Eof`.
///
/// Grammar violations are collected rather than returned one at a time.
/// After a failed condition the parser skips ahead to the next connector (or
/// the closing parenthesis of the enclosing group) and keeps going, so one
/// call to [`Parser::parse`] reports every independent mistake.
///
/// Nesting deeper than [`MAX_DEPTH`] is a syntax error.
pub struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    eof: Token,
    errors: Vec<SyntaxError>,
    depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let end = tokens.last().map_or(0, |t| t.offset + t.lexeme.len());
        Parser {
            tokens,
            position: 0,
            eof: Token::new(TokenKind::Eof, "", end),
            errors: Vec::new(),
            depth: 0,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn check_punct(&self, p: Punct) -> bool {
        self.check(TokenKind::Punct(p))
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Parsed<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        SyntaxError {
            offset: token.offset,
            message: format!("expected {}, found {}", expected, found),
        }
    }

    fn too_deep(&self) -> SyntaxError {
        SyntaxError {
            offset: self.current().offset,
            message: format!("nesting exceeds {} levels", MAX_DEPTH),
        }
    }

    /// Run `rule` one nesting level deeper.
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Parsed<T>) -> Parsed<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Skip past the rest of the atomic expression that started at token
    /// `start`: up to the next connector or the `)` of an enclosing group,
    /// once every bracket opened since `start` is closed.
    fn synchronize(&mut self, start: usize) {
        let mut open = Brackets::default();
        for token in &self.tokens[start..self.position] {
            open.track(token.kind);
        }

        loop {
            let kind = self.current().kind;
            match kind {
                TokenKind::Eof => return,
                TokenKind::Connector(_) if open.stack.is_empty() => return,
                TokenKind::Punct(Punct::RParen) if open.parens == 0 => return,
                _ => open.track(kind),
            }
            self.advance();
        }
    }

    /// Parse the whole token stream into one expression.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression();

        if !self.check(TokenKind::Eof) {
            let err = self.unexpected("'AND', 'OR' or end of input");
            self.errors.push(err);
        }

        match expr {
            Some(expr) if self.errors.is_empty() => Ok(expr),
            _ => Err(ParseError {
                errors: std::mem::take(&mut self.errors),
            }),
        }
    }

    /// `expression := connectorExpr`
    ///
    /// `None` means errors were recorded for this expression.
    pub fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_connector()
    }

    /// `connectorExpr := atomicExpr ( ConnectorOp atomicExpr )*`
    fn parse_connector(&mut self) -> Option<Expr> {
        let mut chain = self.parse_atomic_recovering();
        let mut levels = 0usize;

        while let TokenKind::Connector(op) = self.current().kind {
            // Each switch of operator nests the chain one level.
            if matches!(&chain, Some(Expr::Connector { op: chain_op, .. }) if *chain_op != op) {
                levels += 1;
                if self.depth + levels > MAX_DEPTH {
                    let err = self.too_deep();
                    self.errors.push(err);
                    chain = None;
                }
            }
            self.advance();
            let operand = self.parse_atomic_recovering();
            chain = match (chain, operand) {
                (Some(left), Some(right)) => Some(join(left, op, right)),
                _ => None,
            };
        }
        chain
    }

    fn parse_atomic_recovering(&mut self) -> Option<Expr> {
        let start = self.position;
        match self.parse_atomic() {
            Ok(expr) => expr,
            Err(err) => {
                self.errors.push(err);
                self.synchronize(start);
                None
            }
        }
    }

    /// `atomicExpr := parenExpr | comparisonExpr`
    fn parse_atomic(&mut self) -> Parsed<Option<Expr>> {
        if self.check_punct(Punct::LParen) {
            self.nested(Self::parse_group)
        } else {
            self.parse_comparison().map(Some)
        }
    }

    /// `parenExpr := '(' expression ')'`
    fn parse_group(&mut self) -> Parsed<Option<Expr>> {
        self.advance(); // consume '('
        let inner = self.parse_expression();
        if !self.check_punct(Punct::RParen) {
            return Err(self.unexpected("'AND', 'OR' or ')'"));
        }
        self.advance();
        Ok(inner.map(|e| Expr::Group(Box::new(e))))
    }

    /// `comparisonExpr := value Comparator value`
    fn parse_comparison(&mut self) -> Parsed<Expr> {
        let left = self.parse_value()?;

        let op = match self.current().kind {
            TokenKind::Comparator(op) => op,
            _ => return Err(self.unexpected("a comparison operator")),
        };
        self.advance();

        let right = self.parse_value()?;

        Ok(Expr::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// `value := String | Number | object | array | 'true' | 'false' | 'null' | objectPath`
    fn parse_value(&mut self) -> Parsed<Expr> {
        match self.current().kind {
            TokenKind::Literal(_) => self.parse_literal(),
            TokenKind::Punct(Punct::LBrace) => self.nested(Self::parse_object),
            TokenKind::Punct(Punct::LBracket) => self.nested(Self::parse_array),
            TokenKind::PathSegment => self.nested(Self::parse_path),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_literal(&mut self) -> Parsed<Expr> {
        let token = self.advance();
        let value = decode(&token)?;
        Ok(Expr::Literal {
            value,
            lexeme: token.lexeme,
        })
    }

    /// `object := '{' ( String ':' value ) %',' '}'`
    fn parse_object(&mut self) -> Parsed<Expr> {
        self.advance(); // consume '{'
        let mut entries: Vec<(String, Expr)> = Vec::new();

        if !self.check_punct(Punct::RBrace) {
            loop {
                let key_token = self.expect(TokenKind::Literal(LiteralKind::String))?;
                let Value::String(key) = decode(&key_token)? else {
                    return Err(SyntaxError {
                        offset: key_token.offset,
                        message: "object keys must be strings".to_string(),
                    });
                };
                self.expect(TokenKind::Punct(Punct::Colon))?;
                let value = self.parse_value()?;

                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }

                if self.check_punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.close(Punct::RBrace)?;
        Ok(Expr::Object(entries))
    }

    /// `array := '[' value %',' ']'`
    fn parse_array(&mut self) -> Parsed<Expr> {
        self.advance(); // consume '['
        let items = self.parse_values(Punct::RBracket)?;
        Ok(Expr::Array(items))
    }

    /// `objectPath := segment ( '.' ( segment | functionCall ) )*`
    /// `segment := PathSegment functionCall?`
    fn parse_path(&mut self) -> Parsed<Expr> {
        let mut expr = self.parse_segment(None)?;
        let mut steps = 0usize;

        while self.check_punct(Punct::Period) {
            self.advance();
            steps += 1;
            if self.depth + steps > MAX_DEPTH {
                return Err(self.too_deep());
            }

            if self.check_punct(Punct::LParen) {
                if matches!(expr, Expr::Call { .. }) {
                    return Err(SyntaxError {
                        offset: self.current().offset,
                        message: "a call must follow a path segment".to_string(),
                    });
                }
                expr = self.parse_call(expr)?;
            } else {
                expr = self.parse_segment(Some(expr))?;
            }
        }
        Ok(expr)
    }

    fn parse_segment(&mut self, parent: Option<Expr>) -> Parsed<Expr> {
        let name = self.expect(TokenKind::PathSegment)?.lexeme;
        let path = Expr::Path {
            name,
            parent: parent.map(Box::new),
        };

        if self.check_punct(Punct::LParen) {
            self.parse_call(path)
        } else {
            Ok(path)
        }
    }

    /// `functionCall := '(' value %',' ')'`
    fn parse_call(&mut self, path: Expr) -> Parsed<Expr> {
        self.advance(); // consume '('
        let args = self.parse_values(Punct::RParen)?;
        Ok(Expr::Call {
            path: Box::new(path),
            args,
        })
    }

    /// Comma-separated values up to and including `close`.
    fn parse_values(&mut self, close: Punct) -> Parsed<Vec<Expr>> {
        let mut values = Vec::new();

        if !self.check_punct(close) {
            loop {
                values.push(self.parse_value()?);
                if self.check_punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.close(close)?;
        Ok(values)
    }

    fn close(&mut self, close: Punct) -> Parsed<()> {
        if self.check_punct(close) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("',' or '{}'", close.as_char())))
        }
    }
}

/// Append `right` to a chain under `op`. A chain only absorbs operands of its
/// own operator; switching operators nests the chain so far as the first
/// operand, which keeps evaluation strictly left to right.
fn join(left: Expr, op: ConnectorOp, right: Expr) -> Expr {
    match left {
        Expr::Connector {
            op: chain_op,
            mut operands,
        } if chain_op == op => {
            operands.push(right);
            Expr::Connector { op, operands }
        }
        left => Expr::Connector {
            op,
            operands: vec![left, right],
        },
    }
}

/// Brackets left open while skipping tokens. A `)` also closes any `[` or
/// `{` opened after its `(`.
#[derive(Default)]
struct Brackets {
    stack: Vec<Punct>,
    parens: usize,
}

impl Brackets {
    fn track(&mut self, kind: TokenKind) {
        let TokenKind::Punct(p) = kind else {
            return;
        };
        match p {
            Punct::LParen | Punct::LBrace | Punct::LBracket => {
                if p == Punct::LParen {
                    self.parens += 1;
                }
                self.stack.push(p);
            }
            Punct::RParen if self.parens > 0 => {
                while let Some(top) = self.stack.pop() {
                    if top == Punct::LParen {
                        self.parens -= 1;
                        break;
                    }
                }
            }
            Punct::RBrace | Punct::RBracket => {
                let opener = if p == Punct::RBrace { Punct::LBrace } else { Punct::LBracket };
                if self.stack.last() == Some(&opener) {
                    self.stack.pop();
                }
            }
            _ => {}
        }
    }
}

/// Decode a literal lexeme with JSON semantics.
fn decode(token: &Token) -> Parsed<Value> {
    serde_json::from_str::<serde_json::Value>(&token.lexeme)
        .map(Value::from)
        .map_err(|e| SyntaxError {
            offset: token.offset,
            message: format!("invalid literal {}: {}", token.lexeme, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Expr, ParseError> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(&tokens).parse()
    }

    #[test]
    fn mixed_connectors_nest_left() {
        let expr = parse("a = 1 AND b = 2 OR c = 3").unwrap();
        match expr {
            Expr::Connector {
                op: ConnectorOp::Or,
                operands,
            } => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    &operands[0],
                    Expr::Connector { op: ConnectorOp::And, operands } if operands.len() == 2
                ));
            }
            other => panic!("Expected OR connector, got {:?}", other),
        }
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse("a = 1 b").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].offset, 6);
    }

    #[test]
    fn empty_input_reports_missing_value() {
        let err = parse("").unwrap_err();
        assert_eq!(err.errors[0].message, "expected a value, found end of input");
    }
}
