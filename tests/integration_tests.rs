// tests/integration_tests.rs

use sluice::{Capability, Query, QueryError, Value, query_sync};

fn json(text: &str) -> Value {
    Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap())
}

fn eval(source: &str, context: &str) -> bool {
    query_sync(source, Some(json(context))).unwrap()
}

// ============================================================================
// Literal-only queries
// ============================================================================

#[test]
fn test_literal_scenarios() {
    let cases = vec![
        ("1 = 1", true),
        ("1 = 2", false),
        ("1 != 2", true),
        ("1 != 1", false),
        ("1 = 1 AND 2 = 2", true),
        ("1 = 1 OR 2 = 3", true),
        ("1 = 2 OR 2 = 3", false),
        ("(1 = 2 AND 2 = 3) OR 2 = 2", true),
        ("((1 = 1))", true),
        (r#""abc" = "abc""#, true),
        (r#""abc" = "ABC""#, false),
        ("true = true", true),
        ("true != false", true),
        ("[] = []", true),
        ("{} = {}", true),
        ("[1, 2] = [1, 2]", true),
        ("[1, 2] = [2, 1]", false),
    ];

    for (source, expected) in cases {
        assert_eq!(query_sync(source, None).unwrap(), expected, "Failed for {}", source);
    }
}

#[test]
fn test_whitespace_is_insignificant() {
    assert!(query_sync("1=1 AND(2=2)", None).unwrap());
    assert!(query_sync("\n\t1   =\r\n1\t", None).unwrap());
}

// ============================================================================
// JSON contexts
// ============================================================================

#[test]
fn test_json_context() {
    let ctx = r#"{
        "user": {"name": "Alice", "age": 31, "tags": ["admin", "ops"]},
        "plan": "pro",
        "limits": {"seats": 10, "ratio": 0.75}
    }"#;

    assert!(eval(r#"user.name = "Alice""#, ctx));
    assert!(eval("user.age >= 30 AND user.age < 40", ctx));
    assert!(eval(r#"user.tags = ["admin", "ops"]"#, ctx));
    assert!(eval(r#"plan = "pro" AND limits.seats > 5"#, ctx));
    assert!(eval("limits.ratio < 1", ctx));
    assert!(!eval("limits.ratio > 1", ctx));
    assert!(!eval(r#"user.email = "alice@example.com""#, ctx));
    assert!(!eval(r#"user.email != "alice@example.com""#, ctx));
    assert!(eval(r#"user.email = "x" OR plan = "pro""#, ctx));
}

#[test]
fn test_missing_context() {
    assert!(!query_sync("a = 1", None).unwrap());
    assert!(!query_sync("a != 1", None).unwrap());
    assert!(query_sync("a = 1 OR 1 = 1", None).unwrap());
}

#[test]
fn test_context_that_is_not_an_object() {
    assert!(!query_sync("a = 1", Some(Value::Integer(3))).unwrap());
    assert!(!query_sync("a = 1", Some(json("[1, 2]"))).unwrap());
}

#[test]
fn test_object_members_are_compared_whole() {
    let ctx = r#"{"settings": {"dark": true, "lang": "en"}}"#;
    assert!(eval(r#"settings = {"lang": "en", "dark": true}"#, ctx));
    assert!(!eval(r#"settings = {"lang": "en"}"#, ctx));
}

// ============================================================================
// Query values
// ============================================================================

#[test]
fn test_query_is_reusable() {
    let query: Query = "score > 50".parse().unwrap();
    assert_eq!(query.source(), "score > 50");
    assert_eq!(query.tokens().len(), 4);

    assert!(query.run_sync(Some(json(r#"{"score": 51}"#))).unwrap());
    assert!(!query.run_sync(Some(json(r#"{"score": 50}"#))).unwrap());
    assert!(!query.run_sync(None).unwrap());
}

#[test]
fn test_lex_error_reported_at_construction() {
    let err = Query::new("a = 1 ; b = 2").unwrap_err();
    assert_eq!(err.to_string(), "Lex error: Unexpected character ';' at offset 6");
}

#[test]
fn test_parse_error_reported_on_run() {
    let query = Query::new("a = 1 AND").unwrap();
    let err = query.run_sync(None).unwrap_err();
    assert!(matches!(&err, QueryError::Parse(p) if p.errors.len() == 1));
    assert_eq!(
        err.to_string(),
        "Parse error: 1 syntax error\n  at offset 9: expected a value, found end of input"
    );
}

#[test]
fn test_async_misuse_message() {
    let ctx = Value::object([
        ("a", Value::from(Capability::deferred(|_| async { Value::Null }))),
        ("b", Value::from(Capability::deferred(|_| async { Value::Null }))),
    ]);
    let err = query_sync("a = 1 OR b = 1", Some(ctx)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Deferred values are not supported by run_sync (pending: a, b)"
    );
}

#[test]
fn test_parse_gives_canonical_form() {
    let expr = Query::new("a.b===1 AND(c !== [1,2])").unwrap().parse().unwrap();
    assert_eq!(expr.to_string(), "a.b = 1 AND (c != [1, 2])");
}

#[test]
fn test_deep_nesting_is_reported_not_fatal() {
    let levels = 50_000;
    let source = format!("{}1 = 1{}", "(".repeat(levels), ")".repeat(levels));
    let err = query_sync(&source, None).unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("nesting exceeds"));
}
