use std::{collections::HashMap, mem};

use futures_util::future::join_all;
use tracing::{debug, trace};

use crate::{
    ast::{ConnectorOp, Expr},
    value::{Capability, Deferred, Outcome, Value},
};

/// Result of evaluating a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// No such member, or no context at all
    Absent,
    /// Waiting on a deferred capability result
    Pending,
    Value(Value),
}

impl Resolved {
    pub fn is_truthy(&self) -> bool {
        match self {
            Resolved::Value(v) => v.is_truthy(),
            Resolved::Absent | Resolved::Pending => false,
        }
    }
}

enum Slot {
    Ready(Value),
    Pending,
}

/// Per-call evaluation state: the context root, the memoization cache keyed
/// by dotted path, and deferred results that have not been awaited yet.
///
/// A runner belongs to exactly one call. The asynchronous entry point keeps
/// the same runner across all of its passes so each capability is invoked at
/// most once per call.
pub struct Runner {
    root: Option<Value>,
    cache: HashMap<String, Slot>,
    pending: Vec<(String, Deferred)>,
    deferred_total: usize,
}

impl Runner {
    pub fn new(root: Option<Value>) -> Self {
        Runner {
            root,
            cache: HashMap::new(),
            pending: Vec::new(),
            deferred_total: 0,
        }
    }

    pub fn root(&self) -> Resolved {
        match &self.root {
            Some(root) => Resolved::Value(root.clone()),
            None => Resolved::Absent,
        }
    }

    /// Number of deferred results recorded over the runner's lifetime.
    pub fn deferred_total(&self) -> usize {
        self.deferred_total
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Paths whose deferred results have not been awaited yet.
    pub fn pending_keys(&self) -> Vec<String> {
        self.pending.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Evaluate a whole query expression to its boolean outcome.
    pub fn evaluate(&mut self, expr: &Expr) -> bool {
        expr.evaluate(self, true).is_truthy()
    }

    /// Invoke `capability` unless `key` has been seen before.
    ///
    /// Immediate results are cached as they are. Deferred results are cached
    /// as pending and queued for [`Runner::settle`].
    pub fn invoke(&mut self, key: String, capability: &Capability, args: &[Value]) -> Resolved {
        if let Some(slot) = self.cache.get(&key) {
            return match slot {
                Slot::Ready(value) => Resolved::Value(value.clone()),
                Slot::Pending => Resolved::Pending,
            };
        }

        trace!(%key, args = args.len(), "invoking capability");
        match capability.call(args) {
            Outcome::Immediate(value) => {
                self.cache.insert(key, Slot::Ready(value.clone()));
                Resolved::Value(value)
            }
            Outcome::Deferred(future) => {
                debug!(%key, "capability returned a deferred value");
                self.cache.insert(key.clone(), Slot::Pending);
                self.pending.push((key, future));
                self.deferred_total += 1;
                Resolved::Pending
            }
        }
    }

    /// Await every queued deferred result and store the resolved values.
    pub async fn settle(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let batch = mem::take(&mut self.pending);
        debug!(count = batch.len(), "awaiting deferred values");

        let resolved = join_all(
            batch
                .into_iter()
                .map(|(key, future)| async move { (key, future.await) }),
        )
        .await;

        for (key, value) in resolved {
            trace!(%key, "deferred value resolved");
            self.cache.insert(key, Slot::Ready(value));
        }
    }
}

impl Expr {
    /// Evaluate this node.
    ///
    /// `evaluate == false` marks a branch skipped by a connector's short
    /// circuit: comparisons below it return `false` without resolving their
    /// operands, so no capability is invoked. Literals ignore the flag.
    pub fn evaluate(&self, runner: &mut Runner, evaluate: bool) -> Resolved {
        match self {
            Expr::Literal { value, .. } => Resolved::Value(value.clone()),

            // Array and object literals are constants and resolve their
            // children even inside a skipped branch.
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                let mut pending = false;
                for item in items {
                    match item.evaluate(runner, true) {
                        Resolved::Value(v) => values.push(v),
                        Resolved::Absent => values.push(Value::Null),
                        Resolved::Pending => pending = true,
                    }
                }
                if pending {
                    Resolved::Pending
                } else {
                    Resolved::Value(Value::Array(values))
                }
            }
            Expr::Object(entries) => {
                let mut map = HashMap::with_capacity(entries.len());
                let mut pending = false;
                for (key, expr) in entries {
                    match expr.evaluate(runner, true) {
                        Resolved::Value(v) => {
                            map.insert(key.clone(), v);
                        }
                        Resolved::Absent => {
                            map.insert(key.clone(), Value::Null);
                        }
                        Resolved::Pending => pending = true,
                    }
                }
                if pending {
                    Resolved::Pending
                } else {
                    Resolved::Value(Value::Object(map))
                }
            }

            Expr::Path { name, parent } => {
                match member(parent.as_deref(), name, runner, evaluate) {
                    Ok(Value::Capability(cap)) => runner.invoke(self.path_key(), &cap, &[]),
                    Ok(value) => Resolved::Value(value),
                    Err(unresolved) => unresolved,
                }
            }

            Expr::Call { path, args } => {
                let Expr::Path { name, parent } = path.as_ref() else {
                    return Resolved::Absent;
                };
                let cap = match member(parent.as_deref(), name, runner, evaluate) {
                    Ok(Value::Capability(cap)) => cap,
                    Ok(_) => return Resolved::Absent,
                    Err(unresolved) => return unresolved,
                };

                let mut values = Vec::with_capacity(args.len());
                let mut pending = false;
                for arg in args {
                    match arg.evaluate(runner, evaluate) {
                        Resolved::Value(v) => values.push(v),
                        Resolved::Absent => values.push(Value::Null),
                        Resolved::Pending => pending = true,
                    }
                }
                if pending {
                    return Resolved::Pending;
                }

                runner.invoke(path.path_key(), &cap, &values)
            }

            Expr::Comparison { left, op, right } => {
                if !evaluate {
                    return Resolved::Value(Value::Boolean(false));
                }

                let left = left.evaluate(runner, evaluate);
                let right = right.evaluate(runner, evaluate);
                let result = match (&left, &right) {
                    (Resolved::Value(l), Resolved::Value(r)) => op.test(l, r),
                    _ => false,
                };
                trace!(%op, ?left, ?right, result, "comparison");
                Resolved::Value(Value::Boolean(result))
            }

            Expr::Connector { op, operands } => {
                let Some((first, rest)) = operands.split_first() else {
                    return Resolved::Value(Value::Boolean(false));
                };

                let mut value = first.evaluate(runner, evaluate).is_truthy();
                for operand in rest {
                    let decided = match op {
                        ConnectorOp::And => !value,
                        ConnectorOp::Or => value,
                    };
                    if decided {
                        operand.evaluate(runner, false);
                    } else {
                        value = operand.evaluate(runner, evaluate).is_truthy();
                    }
                }
                Resolved::Value(Value::Boolean(value))
            }

            Expr::Group(inner) => inner.evaluate(runner, evaluate),
        }
    }
}

/// Resolve the base of a path step (its parent, or the context root) and look
/// up `name` on it. `Err` carries an absent or pending outcome to propagate.
fn member(
    parent: Option<&Expr>,
    name: &str,
    runner: &mut Runner,
    evaluate: bool,
) -> Result<Value, Resolved> {
    let base = match parent {
        Some(parent) => parent.evaluate(runner, evaluate),
        None => runner.root(),
    };

    match base {
        Resolved::Value(base) => base.get(name).ok_or(Resolved::Absent),
        unresolved => Err(unresolved),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{lexer::Lexer, parser::Parser};

    fn parse(source: &str) -> Expr {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(&tokens).parse().unwrap()
    }

    fn counter(calls: &Arc<AtomicUsize>, value: i64) -> Value {
        let calls = calls.clone();
        Value::from(Capability::immediate(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Value::Integer(value)
        }))
    }

    #[test]
    fn cache_survives_across_evaluations_of_one_runner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ctx = Value::object([("f", counter(&calls, 4))]);
        let mut runner = Runner::new(Some(ctx));

        assert!(runner.evaluate(&parse("f = 4")));
        assert!(runner.evaluate(&parse("f > 3 AND f < 5")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deferred_result_reads_as_pending_until_settled() {
        let ctx = Value::object([(
            "slow",
            Value::from(Capability::deferred(|_| async { Value::Integer(9) })),
        )]);
        let mut runner = Runner::new(Some(ctx));
        let expr = parse("slow = 9");

        assert!(!runner.evaluate(&expr));
        assert!(runner.has_pending());
        assert_eq!(runner.pending_keys(), vec!["slow".to_string()]);
        assert_eq!(runner.deferred_total(), 1);
    }

    #[test]
    fn missing_root_is_absent() {
        let mut runner = Runner::new(None);
        assert_eq!(parse("a = 1").evaluate(&mut runner, true), Resolved::Value(Value::Boolean(false)));
        assert_eq!(runner.root(), Resolved::Absent);
    }
}
