//! Vereda compiles human-typed filter strings into predicate trees and
//! serves relay-style cursor pagination over any store that can answer a
//! windowed read.
//!
//! The engine is stateless and read-only: parsing is synchronous, and the
//! only I/O is the row fetch plus an optional count issued concurrently
//! against the injected [`store::Datasource`].

#![warn(missing_docs)]

pub mod connection;
pub mod error;
pub mod query;
pub mod select;
pub mod store;

pub use connection::{
    Connection, ConnectionArgs, ConnectionOptions, ConnectionResolver, Edge, OrderBy,
    OrderDirection, PageInfo,
};
pub use error::{Error, Result, StoreError};
pub use query::{
    parse_filter, parse_scalar, Condition, CustomOperators, FilterExpression, Operator, Value,
};
pub use select::{
    build_selection, FieldNode, FieldTree, SelectError, Selection, SelectionNode,
    MAX_SELECT_DEPTH,
};
pub use store::{Datasource, FindManyArgs, MemoryDatasource, Record};
