// tests/cli_tests.rs

#![cfg(feature = "cli")]

use sluice::QueryError;
use sluice::cli::{CheckOptions, CheckResult, CliError, execute_check, explain};

fn check(query: &str, input: Option<&str>) -> Result<CheckResult, CliError> {
    execute_check(&CheckOptions {
        query: query.to_string(),
        input: input.map(str::to_string),
        syntax_only: false,
    })
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_with_json_input() {
    let input = r#"{"status": "active", "count": 3}"#;
    assert_eq!(
        check(r#"status = "active" AND count > 2"#, Some(input)).unwrap(),
        CheckResult::Matched(true)
    );
    assert_eq!(
        check("count > 3", Some(input)).unwrap(),
        CheckResult::Matched(false)
    );
}

#[test]
fn test_check_without_input() {
    assert_eq!(check("1 = 1", None).unwrap(), CheckResult::Matched(true));
    assert_eq!(check("a = 1", None).unwrap(), CheckResult::Matched(false));
}

#[test]
fn test_syntax_only() {
    let options = CheckOptions {
        query: "a.b(1) >= [1, {}]".to_string(),
        input: Some("not json".to_string()),
        syntax_only: true,
    };
    assert_eq!(execute_check(&options).unwrap(), CheckResult::SyntaxValid);
}

#[test]
fn test_syntax_only_reports_errors() {
    let options = CheckOptions {
        query: "a = ".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    let err = execute_check(&options).unwrap_err();
    assert!(matches!(err, CliError::Query(QueryError::Parse(_))));
}

#[test]
fn test_invalid_json_input() {
    let err = check("a = 1", Some("{oops")).unwrap_err();
    assert!(matches!(err, CliError::Json(_)));
    assert!(err.to_string().starts_with("Invalid JSON:"));
}

#[test]
fn test_lex_error_message() {
    let err = check("a = 1 | b = 2", None).unwrap_err();
    assert_eq!(err.to_string(), "Lex error: Unexpected character '|' at offset 6");
}

// ============================================================================
// explain
// ============================================================================

#[test]
fn test_explain_renders_canonical_form() {
    assert_eq!(
        explain(r#"x===1 OR(y.z !== "a")"#).unwrap(),
        r#"x = 1 OR (y.z != "a")"#
    );
    assert_eq!(explain("f.(1,2) > 0").unwrap(), "f(1, 2) > 0");
}

#[test]
fn test_explain_reports_every_error() {
    let err = explain("a = AND b > OR c = 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parse error: 2 syntax errors\n  at offset 4: expected a value, found 'AND'\n  at offset 12: expected a value, found 'OR'"
    );
}
