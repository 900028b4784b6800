//! Relay-style connection envelope and pagination arguments.

use serde::Serialize;

use crate::query::FilterExpression;

/// Caller-facing pagination and filtering arguments.
///
/// `first`/`after` drive forward pagination and `last`/`before` drive
/// backward pagination; the two directions are mutually exclusive, with
/// forward as the default when neither `last` nor `before` is set.
#[derive(Clone, Debug, Default)]
pub struct ConnectionArgs {
    /// Page size for forward pagination.
    pub first: Option<usize>,
    /// Resume after this cursor (forward).
    pub after: Option<String>,
    /// Page size for backward pagination.
    pub last: Option<usize>,
    /// Resume before this cursor (backward).
    pub before: Option<String>,
    /// Human-typed filter string, compiled by the query parser.
    pub query: Option<String>,
    /// Explicit predicate tree merged alongside the compiled query.
    pub filters: Option<FilterExpression>,
    /// Field to sort by instead of the cursor field; dotted paths reach
    /// into relations (`author.name`).
    pub sort_key: Option<String>,
    /// Flips the sort direction derived from `sort_key`.
    pub reverse: bool,
}

/// Sort direction for store reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending, smallest first.
    Asc,
    /// Descending, largest first.
    Desc,
}

impl OrderDirection {
    /// The opposite direction.
    pub fn inverted(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }
}

/// Resolved ordering for a store read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    /// Field path; more than one segment reaches into nested objects.
    pub path: Vec<String>,
    /// Sort direction along the path.
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Builds an ordering from a sort key, splitting dotted paths.
    pub fn new(key: &str, direction: OrderDirection) -> Self {
        Self {
            path: key.split('.').map(str::to_owned).collect(),
            direction,
        }
    }
}

/// One node together with the cursor that resumes after it.
#[derive(Clone, Debug, Serialize)]
pub struct Edge<T> {
    /// The fetched row.
    pub node: T,
    /// Opaque position token for this row.
    pub cursor: String,
}

/// Navigation metadata for the returned window.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether rows exist after this window.
    pub has_next_page: bool,
    /// Whether rows exist before this window.
    pub has_previous_page: bool,
    /// Cursor of the first row, when the window is non-empty.
    pub start_cursor: Option<String>,
    /// Cursor of the last row, when the window is non-empty.
    pub end_cursor: Option<String>,
}

/// The paginated result envelope.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Node-plus-cursor pairs in display order.
    pub edges: Vec<Edge<T>>,
    /// The same rows without cursors, for callers that skip edges.
    pub nodes: Vec<T>,
    /// Navigation metadata.
    pub page_info: PageInfo,
    /// Total rows matching the filter, when the store can count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}
