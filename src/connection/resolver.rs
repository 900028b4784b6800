//! Connection orchestration: merging filters, resolving the cursor
//! boundary, windowing the read, and assembling the result envelope.

use tracing::warn;

use crate::connection::cursor;
use crate::connection::options::ConnectionOptions;
use crate::connection::types::{
    Connection, ConnectionArgs, Edge, OrderBy, OrderDirection, PageInfo,
};
use crate::error::{Error, Result};
use crate::query::{parse_filter, parse_scalar, Condition, FilterExpression, Operator, Value};
use crate::select::{build_selection, FieldNode, FieldTree, Selection, SelectionNode};
use crate::store::{Datasource, FindManyArgs, Record};

/// Read-side resolver binding a store to its pagination configuration.
///
/// Stateless between calls; one instance serves unlimited concurrent
/// requests. The store is injected rather than reached through any
/// process-wide handle, so tests and multi-tenant setups can hold several
/// resolvers side by side.
pub struct ConnectionResolver<D> {
    store: D,
    options: ConnectionOptions,
}

impl<D: Datasource> ConnectionResolver<D> {
    /// Binds `store` and `options` into a resolver.
    pub fn new(store: D, options: ConnectionOptions) -> Self {
        Self { store, options }
    }

    /// Binds `store` with the default options.
    pub fn with_defaults(store: D) -> Self {
        Self::new(store, ConnectionOptions::default())
    }

    /// The active configuration.
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Resolves one page of a connection.
    ///
    /// `fields` is the connection-shaped field tree from the outer
    /// resolver layer; `base_filter` is always conjoined with whatever
    /// `args` contribute. The row fetch and the total count run as two
    /// concurrent reads.
    pub async fn connection(
        &self,
        fields: &FieldTree,
        args: &ConnectionArgs,
        base_filter: Option<FilterExpression>,
    ) -> Result<Connection<Record>> {
        let options = &self.options;

        let parsed = match args.query.as_deref() {
            Some(query) => {
                parse_filter(query, &options.searchable_fields, &options.custom_operators)?
            }
            None => None,
        };
        let mut members = Vec::new();
        if let Some(base) = base_filter {
            members.push(base);
        }
        if let Some(compiled) = parsed {
            members.push(compiled);
        }
        if let Some(explicit) = args.filters.clone() {
            members.push(explicit);
        }
        let filter = FilterExpression::combine(members);

        let forward = args.first.is_some() || (args.last.is_none() && args.before.is_none());
        let requested = args.first.or(args.last).unwrap_or(if forward {
            options.default_first
        } else {
            options.default_last
        });
        let limit = requested.min(options.max_limit);

        let boundary = self.cursor_boundary(args, forward);
        let mut fetch_members = Vec::new();
        if let Some(combined) = filter.clone() {
            fetch_members.push(combined);
        }
        if let Some(boundary) = boundary {
            fetch_members.push(boundary);
        }
        let fetch_filter = FilterExpression::combine(fetch_members);

        let take = (limit as i64) + 1;
        let find_args = FindManyArgs {
            filter: fetch_filter,
            take: if forward { take } else { -take },
            order_by: self.resolve_order(args),
            select: self.connection_selection(fields),
        };

        let (rows, total) = tokio::join!(
            self.store.find_many(find_args),
            self.store.count(filter.as_ref()),
        );
        let mut rows = rows.map_err(|source| Error::store("find_many", source))?;
        let total_count = total.map_err(|source| Error::store("count", source))?;

        let has_extra = rows.len() > limit;
        rows.truncate(limit);
        if !forward {
            rows.reverse();
        }

        let edges: Vec<Edge<Record>> = rows
            .iter()
            .map(|row| Edge {
                cursor: cursor::encode(
                    row.get(&options.cursor_field).unwrap_or(&Value::Null),
                ),
                node: row.clone(),
            })
            .collect();
        let page_info = PageInfo {
            has_next_page: if forward { has_extra } else { args.before.is_some() },
            has_previous_page: if forward { args.after.is_some() } else { has_extra },
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Ok(Connection {
            edges,
            nodes: rows,
            page_info,
            total_count,
        })
    }

    /// Resolves a single record through the same projection machinery.
    ///
    /// The store contract has no dedicated point read, so this issues a
    /// one-row window over the filter.
    pub async fn single(
        &self,
        fields: &FieldTree,
        filter: FilterExpression,
    ) -> Result<Option<Record>> {
        let options = &self.options;
        let select = match build_selection(fields, &options.exclude_fields, &options.field_map)
        {
            Ok(mut selection) => {
                if let Some(extra) = &options.extra_select {
                    for (field, node) in extra {
                        selection.insert(field.clone(), node.clone());
                    }
                }
                if selection.is_empty() {
                    None
                } else {
                    Some(selection)
                }
            }
            Err(error) => {
                warn!(%error, "field projection failed, fetching all fields");
                None
            }
        };
        let find_args = FindManyArgs {
            filter: Some(filter),
            take: 1,
            order_by: OrderBy::new(&options.cursor_field, options.order_direction),
            select,
        };
        let rows = self
            .store
            .find_many(find_args)
            .await
            .map_err(|source| Error::store("find_many", source))?;
        Ok(rows.into_iter().next())
    }

    /// Decodes the direction-appropriate cursor into a boundary condition
    /// on the cursor field. Undecodable cursors degrade to "no cursor"
    /// so a stale token yields the first page instead of an error.
    fn cursor_boundary(&self, args: &ConnectionArgs, forward: bool) -> Option<FilterExpression> {
        let raw = if forward {
            args.after.as_deref()
        } else {
            args.before.as_deref()
        }?;
        match cursor::decode(raw) {
            Ok(decoded) => {
                let operator = boundary_operator(forward, self.options.order_direction);
                Some(FilterExpression::field(
                    self.options.cursor_field.clone(),
                    Condition::new(operator, parse_scalar(&decoded)),
                ))
            }
            Err(error) => {
                warn!(%error, cursor = raw, "ignoring undecodable pagination cursor");
                None
            }
        }
    }

    /// Ordering for the window read: the caller's sort key when given
    /// (reversed on request), otherwise the cursor field in the
    /// configured direction.
    fn resolve_order(&self, args: &ConnectionArgs) -> OrderBy {
        match args.sort_key.as_deref() {
            Some(key) => OrderBy::new(
                key,
                if args.reverse {
                    OrderDirection::Asc
                } else {
                    OrderDirection::Desc
                },
            ),
            None => OrderBy::new(&self.options.cursor_field, self.options.order_direction),
        }
    }

    /// Builds the projection for a connection read, drilling into the
    /// node-level tree and always selecting the cursor field. Failures
    /// fall back to fetching everything; over-fetching is safe,
    /// under-fetching is not.
    fn connection_selection(&self, fields: &FieldTree) -> Option<Selection> {
        let options = &self.options;
        let node_tree = node_fields(fields)?;
        let mut exclude = options.exclude_fields.clone();
        exclude.push("pageInfo".to_owned());
        exclude.push("totalCount".to_owned());
        match build_selection(node_tree, &exclude, &options.field_map) {
            Ok(selection) if selection.is_empty() => None,
            Ok(mut selection) => {
                selection.insert(options.cursor_field.clone(), SelectionNode::Scalar);
                if let Some(extra) = &options.extra_select {
                    for (field, node) in extra {
                        selection.insert(field.clone(), node.clone());
                    }
                }
                Some(selection)
            }
            Err(error) => {
                warn!(%error, "field projection failed, fetching all fields");
                None
            }
        }
    }
}

/// Locates the node-level field tree inside a connection-shaped tree:
/// `edges.node` first, then `nodes`, then the tree itself. `None` means
/// no usable sub-selection was requested.
fn node_fields(fields: &FieldTree) -> Option<&FieldTree> {
    if let Some(FieldNode::Nested(edges)) = fields.get("edges") {
        match edges.get("node") {
            Some(FieldNode::Nested(tree)) => return Some(tree),
            Some(FieldNode::Leaf) => return None,
            None => {}
        }
    }
    match fields.get("nodes") {
        Some(FieldNode::Nested(tree)) => Some(tree),
        Some(FieldNode::Leaf) => None,
        None => Some(fields),
    }
}

/// Comparison bounding the cursor field: with a descending sort, the rows
/// after a cursor are the smaller ones; directions invert for backward
/// pagination.
fn boundary_operator(forward: bool, direction: OrderDirection) -> Operator {
    match (forward, direction) {
        (true, OrderDirection::Desc) | (false, OrderDirection::Asc) => Operator::Lt,
        (true, OrderDirection::Asc) | (false, OrderDirection::Desc) => Operator::Gt,
    }
}
