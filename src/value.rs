use std::{cmp::Ordering, collections::HashMap, fmt, future::Future, sync::Arc};

use futures_util::future::{BoxFuture, FutureExt};
use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A capability result that is not available yet.
pub type Deferred = BoxFuture<'static, Value>;

/// What a capability hands back when it is invoked.
pub enum Outcome {
    /// The value is available right away.
    Immediate(Value),
    /// The value completes later; the asynchronous entry point awaits it.
    Deferred(Deferred),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Immediate(v) => f.debug_tuple("Immediate").field(v).finish(),
            Outcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A context member that has to be invoked, not read, to obtain its value.
///
/// Capabilities are compared by identity: two clones of the same capability
/// are equal, two separately constructed ones never are.
///
/// # Examples
///
/// ```
/// use sluice::{Capability, Outcome, Value};
///
/// let add = Capability::immediate(|args| {
///     let sum: i64 = args.iter().filter_map(|v| v.as_int()).sum();
///     Value::Integer(sum)
/// });
///
/// match add.call(&[Value::Integer(1), Value::Integer(2)]) {
///     Outcome::Immediate(v) => assert_eq!(v, Value::Integer(3)),
///     Outcome::Deferred(_) => unreachable!(),
/// }
/// ```
#[derive(Clone)]
pub struct Capability(Arc<dyn Fn(&[Value]) -> Outcome + Send + Sync>);

impl Capability {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Outcome + Send + Sync + 'static,
    {
        Capability(Arc::new(f))
    }

    /// Wrap a function whose result is always available immediately.
    pub fn immediate<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::new(move |args| Outcome::Immediate(f(args)))
    }

    /// Wrap an async function. Every invocation yields a deferred result.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Self::new(move |args| Outcome::Deferred(f(args).boxed()))
    }

    pub fn call(&self, args: &[Value]) -> Outcome {
        (self.0)(args)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Capability(..)")
    }
}

/// Member lookup for caller-defined context objects.
///
/// Implement this to expose an existing type to queries without converting it
/// into a [`Value::Object`] first. Returning a [`Value::Capability`] makes the
/// member lazily invoked and memoized like any other capability.
pub trait Lookup: Send + Sync {
    fn get(&self, name: &str) -> Option<Value>;
}

/// Shared handle to a [`Lookup`] implementation, compared by identity.
#[derive(Clone)]
pub struct Host(Arc<dyn Lookup>);

impl Host {
    pub fn new<L: Lookup + 'static>(lookup: L) -> Self {
        Host(Arc::new(lookup))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name)
    }
}

impl PartialEq for Host {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Host(..)")
    }
}

/// A value flowing through query evaluation.
///
/// Besides the JSON types (with integers kept apart from floats) a value can
/// hold a [`Capability`], which is invoked when a path reaches it, or a
/// [`Host`] object that answers member lookups itself.
///
/// # Examples
///
/// ```
/// use sluice::{Capability, Value};
///
/// let context = Value::object([
///     ("plan", Value::from("pro")),
///     ("seats", Value::from(12)),
///     ("owner", Value::object([("id", Value::from(7))])),
///     ("now", Value::from(Capability::immediate(|_| Value::from(1_700_000_000)))),
/// ]);
///
/// assert_eq!(context.get("plan"), Some(Value::from("pro")));
/// assert_eq!(context.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),

    /// Invocable member
    Capability(Capability),

    /// Caller-defined object
    Host(Host),
}

impl Value {
    /// Build an object from key/value pairs. Later duplicates overwrite earlier ones.
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn host<L: Lookup + 'static>(lookup: L) -> Self {
        Value::Host(Host::new(lookup))
    }

    /// Look up a member by name. Only objects and host objects have members.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(name).cloned(),
            Value::Host(host) => host.get(name),
            _ => None,
        }
    }

    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0 && !n.is_nan(),
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(_) | Object(_) | Capability(_) | Host(_) => true,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Deep structural equality as used by the `=` family of comparators.
    ///
    /// Numbers compare by value across integer and float, arrays element-wise,
    /// objects by identical key sets with equal values. Capabilities and hosts
    /// compare by identity. Values of different types are never equal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, x)| b.get(k).is_some_and(|y| x.loose_eq(y)))
            }
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.compare(other) == Some(Ordering::Equal)
            }
            _ => self == other,
        }
    }

    /// Native ordering used by `<`, `<=`, `>`, `>=`.
    ///
    /// Numbers order numerically, strings lexicographically and booleans with
    /// `false < true`. Every other pairing is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => compare_mixed(*a, *b),
            (Value::Float(a), Value::Integer(b)) => compare_mixed(*b, *a).map(Ordering::reverse),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Integer against float without rounding the integer through `f64` when the
/// float fits a decimal exactly.
fn compare_mixed(int: i64, float: f64) -> Option<Ordering> {
    if let Some(id) = Decimal::from_i64(int)
        && let Some(fd) = Decimal::from_f64(float)
    {
        return Some(id.cmp(&fd));
    }
    (int as f64).partial_cmp(&float)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Capability> for Value {
    fn from(cap: Capability) -> Self {
        Value::Capability(cap)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
