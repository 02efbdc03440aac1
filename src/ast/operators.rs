use std::{cmp::Ordering, fmt};

use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Equal (`=`, `==`, `===`)
    Equal,
    /// Not equal (`!=`, `!==`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl Comparator {
    /// Canonical spelling. The equality families render as `=` and `!=`.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::LessThan => "<",
            Comparator::GreaterThan => ">",
            Comparator::LessEqual => "<=",
            Comparator::GreaterEqual => ">=",
        }
    }

    /// Apply the operator to two resolved operands.
    pub fn test(self, left: &Value, right: &Value) -> bool {
        match self {
            Comparator::Equal => left.loose_eq(right),
            Comparator::NotEqual => !left.loose_eq(right),
            Comparator::LessThan => left.compare(right) == Some(Ordering::Less),
            Comparator::GreaterThan => left.compare(right) == Some(Ordering::Greater),
            Comparator::LessEqual => matches!(
                left.compare(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparator::GreaterEqual => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical connectors. Written in upper case in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorOp {
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
}

impl fmt::Display for ConnectorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorOp::And => f.write_str("AND"),
            ConnectorOp::Or => f.write_str("OR"),
        }
    }
}
