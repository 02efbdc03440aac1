use std::str::FromStr;

use tracing::debug;

use crate::{
    ast::{Expr, Token},
    error::QueryError,
    evaluator::Runner,
    lexer::Lexer,
    parser::Parser,
    value::Value,
};

/// A compiled query over fixed source text.
///
/// Tokenizing happens once, in [`Query::new`]. The token sequence is
/// read-only afterwards and every run builds its own [`Runner`], so one
/// `Query` can be shared between threads and evaluated against any number of
/// contexts, concurrently or not.
///
/// # Examples
///
/// ```
/// use sluice::{Query, Value};
///
/// let query = Query::new(r#"plan = "pro" AND seats >= 10"#).unwrap();
///
/// let big = Value::object([("plan", Value::from("pro")), ("seats", Value::from(25))]);
/// let small = Value::object([("plan", Value::from("pro")), ("seats", Value::from(3))]);
///
/// assert!(query.run_sync(Some(big)).unwrap());
/// assert!(!query.run_sync(Some(small)).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    tokens: Vec<Token>,
}

impl Query {
    /// Tokenize `source`. Grammar errors are reported by [`Query::parse`] and
    /// by the first run.
    pub fn new(source: impl Into<String>) -> Result<Self, QueryError> {
        let source = source.into();
        let tokens = Lexer::new(&source).tokenize()?;
        Ok(Query { source, tokens })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Build a fresh expression tree from the token sequence.
    pub fn parse(&self) -> Result<Expr, QueryError> {
        Ok(Parser::new(&self.tokens).parse()?)
    }

    /// Evaluate in a single pass.
    ///
    /// Fails with [`QueryError::AsyncMisuse`] when a capability reached during
    /// the pass returned a deferred value; use [`Query::run`] for such
    /// contexts.
    pub fn run_sync(&self, context: Option<Value>) -> Result<bool, QueryError> {
        let expr = self.parse()?;
        let mut runner = Runner::new(context);
        let result = runner.evaluate(&expr);

        if runner.has_pending() {
            return Err(QueryError::AsyncMisuse {
                pending: runner.pending_keys(),
            });
        }
        Ok(result)
    }

    /// Evaluate until every reachable deferred value has been resolved.
    ///
    /// Each pass first awaits the deferred values recorded so far, then
    /// re-parses and re-evaluates with the same cache. The loop ends after a
    /// pass that records no new deferred value. There is no pass limit: a
    /// context that keeps producing new deferred values keeps the loop going.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::{Capability, Query, Value};
    ///
    /// let ctx = Value::object([(
    ///     "mykey",
    ///     Value::from(Capability::deferred(|_| async { Value::from(1) })),
    /// )]);
    ///
    /// let query = Query::new("1 = mykey").unwrap();
    /// let result = tokio::runtime::Runtime::new()
    ///     .unwrap()
    ///     .block_on(query.run(Some(ctx)))
    ///     .unwrap();
    /// assert!(result);
    /// ```
    pub async fn run(&self, context: Option<Value>) -> Result<bool, QueryError> {
        let mut runner = Runner::new(context);
        let mut pass = 0usize;

        loop {
            runner.settle().await;
            let seen = runner.deferred_total();

            let expr = self.parse()?;
            let result = runner.evaluate(&expr);
            pass += 1;

            let fresh = runner.deferred_total() - seen;
            debug!(pass, fresh, result, "evaluation pass finished");
            if fresh == 0 {
                return Ok(result);
            }
        }
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::new(s)
    }
}

/// Compile and run `source` once, synchronously.
///
/// # Examples
///
/// ```
/// use sluice::query_sync;
///
/// assert!(query_sync("(1 = 2 AND 2 = 3) OR 2 = 2", None).unwrap());
/// ```
pub fn query_sync(source: &str, context: Option<Value>) -> Result<bool, QueryError> {
    Query::new(source)?.run_sync(context)
}

/// Compile and run `source` once with the asynchronous entry point.
pub async fn query(source: &str, context: Option<Value>) -> Result<bool, QueryError> {
    Query::new(source)?.run(context).await
}
