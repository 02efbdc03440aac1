// tests/lexer_tests.rs

use sluice::ast::{Comparator, ConnectorOp, LiteralKind, Punct, Token, TokenKind};
use sluice::lexer::Lexer;
use sluice::LexError;

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn single(input: &str) -> Token {
    let mut tokens = Lexer::new(input).tokenize().unwrap();
    assert_eq!(tokens.len(), 2, "Expected one token for input: {}", input);
    assert_eq!(tokens[1].kind, TokenKind::Eof);
    tokens.remove(0)
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_punctuation() {
    let test_cases = vec![
        ("(", Punct::LParen),
        (")", Punct::RParen),
        ("{", Punct::LBrace),
        ("}", Punct::RBrace),
        ("[", Punct::LBracket),
        ("]", Punct::RBracket),
        (",", Punct::Comma),
        (":", Punct::Colon),
        (".", Punct::Period),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Punct(expected), "Failed for input: {}", input);
        assert_eq!(token.lexeme, input);
    }
}

// ============================================================================
// Comparators
// ============================================================================

#[test]
fn test_comparators() {
    let test_cases = vec![
        (">", Comparator::GreaterThan),
        (">=", Comparator::GreaterEqual),
        ("<", Comparator::LessThan),
        ("<=", Comparator::LessEqual),
        ("=", Comparator::Equal),
        ("==", Comparator::Equal),
        ("===", Comparator::Equal),
        ("!=", Comparator::NotEqual),
        ("!==", Comparator::NotEqual),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Comparator(expected), "Failed for input: {}", input);
        assert_eq!(token.lexeme, input);
    }
}

#[test]
fn test_four_equals_split() {
    let tokens = Lexer::new("====").tokenize().unwrap();
    assert_eq!(tokens[0].lexeme, "===");
    assert_eq!(tokens[1].lexeme, "=");
    assert_eq!(tokens[1].offset, 3);
}

#[test]
fn test_comparator_without_spaces() {
    assert_eq!(
        kinds("a>=1"),
        vec![
            TokenKind::PathSegment,
            TokenKind::Comparator(Comparator::GreaterEqual),
            TokenKind::Literal(LiteralKind::Number),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lone_bang_is_an_error() {
    let err = Lexer::new("a ! 1").tokenize().unwrap_err();
    assert_eq!(err, LexError { offset: 2, found: '!' });
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    for input in ["0", "7", "-7", "42", "3.25", "-0.5", "1e9", "2E-3", "6.02e+23"] {
        let token = single(input);
        assert_eq!(
            token.kind,
            TokenKind::Literal(LiteralKind::Number),
            "Failed for input: {}",
            input
        );
        assert_eq!(token.lexeme, input);
    }
}

#[test]
fn test_leading_zero_splits() {
    // Only a lone 0 may start with zero; "012" is "0" followed by "12".
    let tokens = Lexer::new("012").tokenize().unwrap();
    assert_eq!(tokens[0].lexeme, "0");
    assert_eq!(tokens[1].lexeme, "12");
}

#[test]
fn test_lone_minus_is_an_error() {
    let err = Lexer::new("- 1").tokenize().unwrap_err();
    assert_eq!(err.offset, 0);
    assert_eq!(err.found, '-');
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_strings() {
    let test_cases = vec![r#""""#, r#""hello""#, r#""say \"hi\"""#, r#""a\\b""#, r#""tab\t""#];

    for input in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Literal(LiteralKind::String));
        assert_eq!(token.lexeme, input);
    }
}

#[test]
fn test_unterminated_string() {
    let err = Lexer::new(r#"name = "abc"#).tokenize().unwrap_err();
    assert_eq!(err, LexError { offset: 7, found: '"' });
}

// ============================================================================
// Words
// ============================================================================

#[test]
fn test_keywords_need_whole_word() {
    assert_eq!(
        kinds("ANDROID ORbit trueish nullable falsey"),
        vec![
            TokenKind::PathSegment,
            TokenKind::PathSegment,
            TokenKind::PathSegment,
            TokenKind::PathSegment,
            TokenKind::PathSegment,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_connectors_are_case_sensitive() {
    assert_eq!(
        kinds("and AND or OR"),
        vec![
            TokenKind::PathSegment,
            TokenKind::Connector(ConnectorOp::And),
            TokenKind::PathSegment,
            TokenKind::Connector(ConnectorOp::Or),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_identifiers_reject_underscore() {
    let err = Lexer::new("user_id = 1").tokenize().unwrap_err();
    assert_eq!(err, LexError { offset: 4, found: '_' });
}

// ============================================================================
// Whole queries
// ============================================================================

#[test]
fn test_offsets_skip_whitespace() {
    let tokens = Lexer::new("  a.b  =\n\t\"x\"").tokenize().unwrap();
    let offsets: Vec<_> = tokens.iter().map(|t| (t.lexeme.as_str(), t.offset)).collect();
    assert_eq!(
        offsets,
        vec![("a", 2), (".", 3), ("b", 4), ("=", 7), ("\"x\"", 10), ("", 13)]
    );
}

#[test]
fn test_function_call_and_literals() {
    assert_eq!(
        kinds(r#"add(1, [2], {"k": null}) == 3"#),
        vec![
            TokenKind::PathSegment,
            TokenKind::Punct(Punct::LParen),
            TokenKind::Literal(LiteralKind::Number),
            TokenKind::Punct(Punct::Comma),
            TokenKind::Punct(Punct::LBracket),
            TokenKind::Literal(LiteralKind::Number),
            TokenKind::Punct(Punct::RBracket),
            TokenKind::Punct(Punct::Comma),
            TokenKind::Punct(Punct::LBrace),
            TokenKind::Literal(LiteralKind::String),
            TokenKind::Punct(Punct::Colon),
            TokenKind::Literal(LiteralKind::Null),
            TokenKind::Punct(Punct::RBrace),
            TokenKind::Punct(Punct::RParen),
            TokenKind::Comparator(Comparator::Equal),
            TokenKind::Literal(LiteralKind::Number),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unexpected_character() {
    let err = Lexer::new("a = 1 & b = 2").tokenize().unwrap_err();
    assert_eq!(err, LexError { offset: 6, found: '&' });
}

#[test]
fn test_non_ascii_offset_is_in_bytes() {
    let err = Lexer::new(r#""é" = ü"#).tokenize().unwrap_err();
    assert_eq!(err.offset, 7);
    assert_eq!(err.found, 'ü');
}
