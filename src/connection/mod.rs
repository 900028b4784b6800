#![forbid(unsafe_code)]

//! Cursor pagination over a filtered, ordered window.
//!
//! The resolver fetches one row beyond the requested window so page
//! navigation flags come from a single read, and it re-reverses backward
//! windows into display order before assembling edges.

/// Opaque cursor encoding and decoding.
pub mod cursor;

/// Resolver configuration.
pub mod options;

/// The connection and single-record resolvers.
pub mod resolver;

/// Envelope types: arguments, edges, page info, ordering.
pub mod types;

pub use options::ConnectionOptions;
pub use resolver::ConnectionResolver;
pub use types::{Connection, ConnectionArgs, Edge, OrderBy, OrderDirection, PageInfo};
