pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod value;

pub use ast::{Comparator, ConnectorOp, Expr, Token, TokenKind};
pub use error::{LexError, ParseError, QueryError, SyntaxError};
pub use evaluator::{Resolved, Runner};
pub use lexer::Lexer;
pub use parser::Parser;
pub use query::{Query, query, query_sync};
pub use value::{Capability, Deferred, Host, Lookup, Outcome, Value};
