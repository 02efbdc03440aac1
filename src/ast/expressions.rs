use std::fmt;

use crate::{
    ast::{Comparator, ConnectorOp},
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed query.
///
/// A fresh tree is built for every evaluation pass; nodes are never mutated
/// after construction. `Display` gives the canonical rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Decoded JSON scalar, with the source lexeme kept for rendering
    ///
    /// # Example
    /// ```text
    /// 42
    /// "gold"
    /// null
    /// ```
    Literal { value: Value, lexeme: String },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, "two", plan]
    /// ```
    Array(Vec<Expr>),

    /// Object literal, keys unique (the last duplicate wins)
    ///
    /// # Example
    /// ```text
    /// {"tier": "gold", "seats": 5}
    /// ```
    Object(Vec<(String, Expr)>),

    /// One step of a context path. `parent` is `None` for the first step,
    /// which is looked up on the context root.
    ///
    /// # Example
    /// ```text
    /// account.owner.email
    /// ```
    Path {
        name: String,
        parent: Option<Box<Expr>>,
    },

    /// Invocation of the capability reached by `path` (always a `Path`)
    ///
    /// # Examples
    /// ```text
    /// add(1, 2)
    /// limits.for("eu")
    /// ```
    Call { path: Box<Expr>, args: Vec<Expr> },

    /// Comparison between two values
    Comparison {
        left: Box<Expr>,
        op: Comparator,
        right: Box<Expr>,
    },

    /// Short-circuiting chain of one or more operands joined by `op`
    Connector { op: ConnectorOp, operands: Vec<Expr> },

    /// Parenthesized expression
    Group(Box<Expr>),
}

impl Expr {
    /// Memoization key of a `Path` or `Call`: the dotted chain of segment
    /// names from the root. Call arguments never take part in the key.
    pub fn path_key(&self) -> String {
        match self {
            Expr::Path { name, parent: None } => name.clone(),
            Expr::Path {
                name,
                parent: Some(parent),
            } => format!("{}.{}", parent.path_key(), name),
            Expr::Call { path, .. } => path.path_key(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { lexeme, .. } => f.write_str(lexeme),
            Expr::Array(items) => {
                f.write_str("[")?;
                write_joined(f, items, ", ")?;
                f.write_str("]")
            }
            Expr::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", serde_json::Value::from(key.as_str()), value)?;
                }
                f.write_str("}")
            }
            Expr::Path { name, parent: None } => f.write_str(name),
            Expr::Path {
                name,
                parent: Some(parent),
            } => write!(f, "{}.{}", parent, name),
            Expr::Call { path, args } => {
                write!(f, "{}(", path)?;
                write_joined(f, args, ", ")?;
                f.write_str(")")
            }
            Expr::Comparison { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Connector { op, operands } => {
                write_joined(f, operands, &format!(" {} ", op))
            }
            Expr::Group(inner) => write!(f, "({})", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
