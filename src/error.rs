#![forbid(unsafe_code)]

//! Crate-wide error taxonomy.
//!
//! Two layers: [`StoreError`] is what a [`Datasource`](crate::store::Datasource)
//! implementation surfaces, and [`Error`] is what the engine returns to callers,
//! with store failures wrapped alongside the operation that triggered them.

use std::io;

use thiserror::Error;

use crate::select::SelectError;

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a backing store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure inside the store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Backend-specific failure, carried as text.
    #[error("backend failure: {0}")]
    Backend(String),
    /// The store does not implement the requested capability.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Errors returned by the filter compiler and the connection resolver.
#[derive(Debug, Error)]
pub enum Error {
    /// A `field:value` segment had an empty field or an empty value.
    #[error("malformed query segment '{segment}'")]
    MalformedQuery {
        /// The offending segment, as written by the caller.
        segment: String,
    },
    /// A pagination cursor could not be decoded back to a boundary value.
    #[error("invalid cursor")]
    InvalidCursor,
    /// Field-tree translation failed; the resolver falls back to fetching
    /// all fields instead of propagating this.
    #[error("projection failed: {0}")]
    Projection(#[from] SelectError),
    /// A store read failed mid-request. No partial page is returned.
    #[error("store {operation} failed: {source}")]
    Store {
        /// Which store call failed.
        operation: &'static str,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },
}

impl Error {
    pub(crate) fn store(operation: &'static str, source: StoreError) -> Self {
        Error::Store { operation, source }
    }
}
