#![forbid(unsafe_code)]

//! Filter-string compilation.
//!
//! Turns a human-typed query such as
//! `title:*phone* AND category:[electronics,mobile] AND price:>200` into
//! the predicate tree stores consume. Parsing is total apart from the
//! malformed `field:`/`:value` shapes; unrecognized operator syntax
//! degrades to a literal string match.

/// Single-segment condition parsing and the custom operator table.
pub mod condition;

/// Predicate tree types and their wire serialization.
pub mod filter;

/// Whole-query compilation: joiner splitting and full-text fallback.
pub mod parser;

/// Scalar values and the total token-to-value parser.
pub mod value;

pub use condition::CustomOperators;
pub use filter::{Condition, FilterExpression, Operator};
pub use parser::parse_filter;
pub use value::{parse_scalar, Value};
