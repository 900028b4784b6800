#![forbid(unsafe_code)]

//! Field projection: translating a caller-declared field tree into the
//! minimal selection shape a store fetches.
//!
//! The field tree arrives from an outer resolver layer that already
//! introspected the request; this module only reshapes it. Translation is
//! a pure recursive walk: leaves become scalar markers, nested trees
//! recurse and are dropped when they prune to nothing, and excluded
//! meta-fields disappear at every level. An empty overall selection means
//! "no explicit selection" and callers fall back to fetching all fields.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Recursion budget for selection trees. Request-scoped trees are tiny;
/// anything deeper is a malformed or adversarial input.
pub const MAX_SELECT_DEPTH: usize = 32;

/// Errors raised while translating a field tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The field tree nests beyond [`MAX_SELECT_DEPTH`].
    #[error("field tree exceeds depth {max}")]
    TooDeep {
        /// The enforced budget.
        max: usize,
    },
}

/// One requested field: a scalar leaf or a nested sub-tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldNode {
    /// Scalar field.
    Leaf,
    /// Object or relation field with its own requested sub-fields.
    Nested(FieldTree),
}

/// Requested field names mapped to their shape. Built fresh per request,
/// never persisted.
pub type FieldTree = BTreeMap<String, FieldNode>;

/// One selected field in the store's selection shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionNode {
    /// Fetch the scalar column.
    Scalar,
    /// Fetch a relation with its own nested selection.
    Nested(Selection),
}

/// The store's minimal selection shape.
pub type Selection = BTreeMap<String, SelectionNode>;

impl Serialize for SelectionNode {
    /// Scalars serialize as `true`, relations as `{"select": …}`, which is
    /// the conventional shape document stores accept.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectionNode::Scalar => serializer.serialize_bool(true),
            SelectionNode::Nested(selection) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("select", selection)?;
                map.end()
            }
        }
    }
}

/// Translates a field tree into a selection, applying the exclusion list
/// and field-name remapping at every recursion level.
///
/// A nested field whose child selection prunes to nothing is dropped
/// entirely. An empty result is a valid outcome and signals "select
/// everything" to the caller.
pub fn build_selection(
    tree: &FieldTree,
    exclude_fields: &[String],
    field_map: &BTreeMap<String, String>,
) -> Result<Selection, SelectError> {
    build_at_depth(tree, exclude_fields, field_map, 0)
}

fn build_at_depth(
    tree: &FieldTree,
    exclude_fields: &[String],
    field_map: &BTreeMap<String, String>,
    depth: usize,
) -> Result<Selection, SelectError> {
    if depth >= MAX_SELECT_DEPTH {
        return Err(SelectError::TooDeep {
            max: MAX_SELECT_DEPTH,
        });
    }
    let mut selection = Selection::new();
    for (name, node) in tree {
        if exclude_fields.iter().any(|excluded| excluded == name) {
            continue;
        }
        let mapped = field_map.get(name).unwrap_or(name).clone();
        match node {
            FieldNode::Leaf => {
                selection.insert(mapped, SelectionNode::Scalar);
            }
            FieldNode::Nested(child) => {
                let nested = build_at_depth(child, exclude_fields, field_map, depth + 1)?;
                if !nested.is_empty() {
                    selection.insert(mapped, SelectionNode::Nested(nested));
                }
            }
        }
    }
    Ok(selection)
}
