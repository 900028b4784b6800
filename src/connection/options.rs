//! Resolver configuration.

use std::collections::BTreeMap;

use crate::connection::types::OrderDirection;
use crate::query::CustomOperators;
use crate::select::Selection;

/// Tuning knobs for the connection and single-record resolvers.
///
/// The defaults match a typical content listing: pages of 20 capped at
/// 100, newest first by `id`, free text scanned over title/name/
/// description, and GraphQL introspection markers excluded from
/// projections.
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    /// Page size when forward pagination gives no `first`.
    pub default_first: usize,
    /// Page size when backward pagination gives no `last`.
    pub default_last: usize,
    /// Hard cap applied to any requested page size.
    pub max_limit: usize,
    /// Field the cursor encodes and the default sort key.
    pub cursor_field: String,
    /// Sort direction used with the cursor field.
    pub order_direction: OrderDirection,
    /// Field names dropped from projections at every level.
    pub exclude_fields: Vec<String>,
    /// Fields scanned by the free-text fallback.
    pub searchable_fields: Vec<String>,
    /// Caller-registered operator prefixes for the filter compiler.
    pub custom_operators: CustomOperators,
    /// Renames applied while translating field trees.
    pub field_map: BTreeMap<String, String>,
    /// Extra selection entries merged into every computed projection.
    pub extra_select: Option<Selection>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            default_first: 20,
            default_last: 20,
            max_limit: 100,
            cursor_field: "id".to_owned(),
            order_direction: OrderDirection::Desc,
            exclude_fields: vec!["__typename".to_owned()],
            searchable_fields: vec![
                "title".to_owned(),
                "name".to_owned(),
                "description".to_owned(),
            ],
            custom_operators: CustomOperators::new(),
            field_map: BTreeMap::new(),
            extra_select: None,
        }
    }
}
