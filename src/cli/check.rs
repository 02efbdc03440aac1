//! Execute sluice queries against JSON input

use tracing::debug;

use super::CliError;
use crate::{Query, Value};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to evaluate
    pub query: String,
    /// JSON context; the query runs without a context when absent
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query evaluated to this boolean
    Matched(bool),
}

/// Execute a sluice check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = Query::new(options.query.as_str())?;

    if options.syntax_only {
        query.parse()?;
        return Ok(CheckResult::SyntaxValid);
    }

    let context = match &options.input {
        Some(json) => {
            let json: serde_json::Value = serde_json::from_str(json)?;
            Some(Value::from(json))
        }
        None => None,
    };
    debug!(has_context = context.is_some(), "evaluating query");

    // JSON contexts never hold capabilities, so one synchronous pass is exact.
    let matched = query.run_sync(context)?;
    Ok(CheckResult::Matched(matched))
}

/// Canonical rendering of the parsed query.
pub fn explain(source: &str) -> Result<String, CliError> {
    let expr = Query::new(source)?.parse()?;
    Ok(expr.to_string())
}
