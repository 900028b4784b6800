#![forbid(unsafe_code)]

//! The backing-store seam.
//!
//! The engine consumes a store through [`Datasource`], a deliberately
//! minimal read contract: one windowed fetch and one optional count. It
//! never assumes a query language beyond the predicate tree, and it never
//! writes.

use std::collections::BTreeMap;

use crate::connection::types::OrderBy;
use crate::error::StoreError;
use crate::query::{FilterExpression, Value};
use crate::select::Selection;

/// In-memory reference implementation of [`Datasource`].
pub mod memory;

pub use memory::MemoryDatasource;

/// Dynamic row shape returned by stores.
pub type Record = BTreeMap<String, Value>;

/// Arguments for one windowed read.
#[derive(Clone, Debug)]
pub struct FindManyArgs {
    /// Predicate the rows must satisfy; `None` matches everything.
    pub filter: Option<FilterExpression>,
    /// Window size. Negative values invert the sort and take that many
    /// rows from the far boundary; such rows come back in the inverted
    /// order and the caller restores display order.
    pub take: i64,
    /// Ordering applied before the window is cut.
    pub order_by: OrderBy,
    /// Fields to fetch; `None` fetches everything.
    pub select: Option<Selection>,
}

/// Minimal async read contract the engine drives.
///
/// Both operations are read-only and may observe slightly different
/// snapshots when issued concurrently; the engine tolerates that.
pub trait Datasource {
    /// Fetches rows matching `args`, ordered and windowed per the
    /// [`FindManyArgs`] contract.
    fn find_many(
        &self,
        args: FindManyArgs,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Counts rows matching `filter`. Stores that cannot count cheaply
    /// keep the default, which reports the capability as absent.
    fn count(
        &self,
        filter: Option<&FilterExpression>,
    ) -> impl std::future::Future<Output = Result<Option<u64>, StoreError>> + Send {
        let _ = filter;
        async { Ok(None) }
    }
}
