//! # Sluice Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) for the
//! Sluice filter language, a small boolean language for gating features and
//! filtering records against a runtime context.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, paths, calls, comparisons, connectors)
//! - **[operators]** - Comparison and connector operators
//!
//! ## Quick Start
//!
//! ```text
//! plan = "pro" AND (seats >= 10 OR account.flags.beta = true)
//! ```
//!
//! This query is true for pro accounts with at least ten seats, or pro
//! accounts in the beta program.
//!
//! ## Core Concepts
//!
//! ### Comparisons
//!
//! Every condition compares two values. Values are JSON literals
//! (`"text"`, `12`, `true`, `null`, `[1, 2]`, `{"k": 1}`) or context paths.
//!
//! ### Paths
//!
//! A path is a chain of names separated by `.` and rooted at the context.
//! Missing members are not errors; a comparison touching one is false.
//!
//! ### Capabilities
//!
//! A context member can be a function. Reaching it through a path invokes it
//! (at most once per run) and a `(...)` suffix passes arguments:
//!
//! ```text
//! quota.remaining("eu") > 0
//! ```
//!
//! ### Connectors
//!
//! `AND` and `OR` chain conditions strictly left to right, with no precedence
//! between them. Parentheses group. Skipped operands never invoke anything.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{Comparator, ConnectorOp};
pub use tokens::{LiteralKind, Punct, Token, TokenKind};
