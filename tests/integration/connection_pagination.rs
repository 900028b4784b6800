//! End-to-end pagination behavior against the in-memory store.

use std::future::Future;

use tracing_subscriber::EnvFilter;
use vereda::{
    Condition, Connection, ConnectionArgs, ConnectionOptions, ConnectionResolver, Datasource,
    Error, FieldNode, FieldTree, FilterExpression, FindManyArgs, MemoryDatasource, Operator,
    Record, StoreError, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn post(id: i64) -> Record {
    let status = if id % 2 == 1 { "active" } else { "draft" };
    let mut author = std::collections::BTreeMap::new();
    author.insert("name".to_owned(), Value::String(format!("author-{id}")));
    [
        ("id".to_owned(), Value::Int(id)),
        ("title".to_owned(), Value::String(format!("Post {id}"))),
        ("status".to_owned(), Value::String(status.to_owned())),
        ("author".to_owned(), Value::Object(author)),
    ]
    .into_iter()
    .collect()
}

fn seeded(count: i64) -> MemoryDatasource {
    MemoryDatasource::with_rows((1..=count).map(post).collect())
}

fn resolver(count: i64) -> ConnectionResolver<MemoryDatasource> {
    ConnectionResolver::with_defaults(seeded(count))
}

fn leaf_tree(names: &[&str]) -> FieldTree {
    names
        .iter()
        .map(|name| ((*name).to_owned(), FieldNode::Leaf))
        .collect()
}

fn connection_tree(node_fields: &[&str]) -> FieldTree {
    let mut edges = FieldTree::new();
    edges.insert("cursor".to_owned(), FieldNode::Leaf);
    edges.insert(
        "node".to_owned(),
        FieldNode::Nested(leaf_tree(node_fields)),
    );
    let mut tree = FieldTree::new();
    tree.insert("edges".to_owned(), FieldNode::Nested(edges));
    tree.insert(
        "pageInfo".to_owned(),
        FieldNode::Nested(leaf_tree(&["hasNextPage", "endCursor"])),
    );
    tree.insert("totalCount".to_owned(), FieldNode::Leaf);
    tree
}

fn ids(connection: &Connection<Record>) -> Vec<i64> {
    connection
        .nodes
        .iter()
        .map(|row| match row.get("id") {
            Some(Value::Int(id)) => *id,
            other => panic!("unexpected id value {other:?}"),
        })
        .collect()
}

fn first(n: usize) -> ConnectionArgs {
    ConnectionArgs {
        first: Some(n),
        ..ConnectionArgs::default()
    }
}

#[tokio::test]
async fn first_page_overfetches_to_detect_more() {
    let resolver = resolver(5);
    let page = resolver
        .connection(&FieldTree::new(), &first(2), None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![5, 4]);
    assert!(page.page_info.has_next_page);
    assert!(!page.page_info.has_previous_page);
    assert_eq!(page.total_count, Some(5));
    assert_eq!(page.edges.len(), page.nodes.len());
    assert_eq!(
        page.page_info.end_cursor,
        Some(page.edges[1].cursor.clone())
    );
}

#[tokio::test]
async fn forward_traversal_covers_every_row_once() {
    let resolver = resolver(7);
    let mut collected = Vec::new();
    let mut after: Option<String> = None;
    let mut pages = 0;
    loop {
        let args = ConnectionArgs {
            first: Some(3),
            after: after.clone(),
            ..ConnectionArgs::default()
        };
        let page = resolver
            .connection(&FieldTree::new(), &args, None)
            .await
            .expect("connection");
        collected.extend(ids(&page));
        pages += 1;
        if !page.page_info.has_next_page {
            break;
        }
        after = page.page_info.end_cursor.clone();
    }
    assert_eq!(pages, 3);
    assert_eq!(collected, vec![7, 6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn last_without_cursor_returns_the_tail_in_display_order() {
    let resolver = resolver(5);
    let args = ConnectionArgs {
        last: Some(2),
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![2, 1]);
    assert!(page.page_info.has_previous_page);
    assert!(!page.page_info.has_next_page);
}

#[tokio::test]
async fn backward_traversal_covers_every_row_once() {
    let resolver = resolver(5);
    let mut collected = Vec::new();
    let mut before: Option<String> = None;
    loop {
        let args = ConnectionArgs {
            last: Some(2),
            before: before.clone(),
            ..ConnectionArgs::default()
        };
        let page = resolver
            .connection(&FieldTree::new(), &args, None)
            .await
            .expect("connection");
        let mut page_ids = ids(&page);
        page_ids.extend(collected);
        collected = page_ids;
        if !page.page_info.has_previous_page {
            break;
        }
        before = page.page_info.start_cursor.clone();
    }
    assert_eq!(collected, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn undecodable_cursor_degrades_to_the_first_page() {
    init_tracing();
    let resolver = resolver(4);
    let args = ConnectionArgs {
        first: Some(2),
        after: Some("definitely not a cursor".to_owned()),
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![4, 3]);
    // Argument presence, not cursor validity, drives the opposite flag.
    assert!(page.page_info.has_previous_page);
}

#[tokio::test]
async fn query_string_narrows_rows_and_count() {
    let resolver = resolver(6);
    let args = ConnectionArgs {
        first: Some(10),
        query: Some("status:active".to_owned()),
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![5, 3, 1]);
    assert_eq!(page.total_count, Some(3));
    assert!(!page.page_info.has_next_page);
}

#[tokio::test]
async fn free_text_queries_search_the_title() {
    let resolver = resolver(5);
    let args = ConnectionArgs {
        first: Some(10),
        query: Some("post 3".to_owned()),
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![3]);
}

#[tokio::test]
async fn base_explicit_and_query_filters_conjoin() {
    let resolver = resolver(6);
    let base = FilterExpression::field("status", Condition::equals("active"));
    let args = ConnectionArgs {
        first: Some(10),
        filters: Some(FilterExpression::field(
            "id",
            Condition::new(Operator::Lte, 4_i64),
        )),
        query: Some("title:*post*".to_owned()),
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, Some(base))
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![3, 1]);
    assert_eq!(page.total_count, Some(2));
}

#[tokio::test]
async fn malformed_query_fails_the_request() {
    let resolver = resolver(3);
    let args = ConnectionArgs {
        first: Some(2),
        query: Some("title:".to_owned()),
        ..ConnectionArgs::default()
    };
    let err = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect_err("request should fail");
    assert!(matches!(err, Error::MalformedQuery { .. }));
}

#[tokio::test]
async fn page_size_clamps_to_the_limit() {
    let store = seeded(10);
    let options = ConnectionOptions {
        max_limit: 3,
        ..ConnectionOptions::default()
    };
    let resolver = ConnectionResolver::new(store, options);
    let page = resolver
        .connection(&FieldTree::new(), &first(50), None)
        .await
        .expect("connection");
    assert_eq!(page.nodes.len(), 3);
    assert!(page.page_info.has_next_page);
}

#[tokio::test]
async fn default_page_size_applies_when_unspecified() {
    let store = seeded(30);
    let options = ConnectionOptions {
        default_first: 4,
        ..ConnectionOptions::default()
    };
    let resolver = ConnectionResolver::new(store, options);
    let page = resolver
        .connection(&FieldTree::new(), &ConnectionArgs::default(), None)
        .await
        .expect("connection");
    assert_eq!(page.nodes.len(), 4);
    assert_eq!(ids(&page), vec![30, 29, 28, 27]);
}

#[tokio::test]
async fn sort_key_overrides_the_cursor_ordering() {
    let resolver = resolver(3);
    let args = ConnectionArgs {
        first: Some(3),
        sort_key: Some("title".to_owned()),
        reverse: true,
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![1, 2, 3]);
}

#[tokio::test]
async fn nested_sort_keys_reach_into_relations() {
    let resolver = resolver(3);
    let args = ConnectionArgs {
        first: Some(3),
        sort_key: Some("author.name".to_owned()),
        reverse: true,
        ..ConnectionArgs::default()
    };
    let page = resolver
        .connection(&FieldTree::new(), &args, None)
        .await
        .expect("connection");
    assert_eq!(ids(&page), vec![1, 2, 3]);
}

#[tokio::test]
async fn requested_fields_shape_the_fetched_rows() {
    let resolver = resolver(3);
    let page = resolver
        .connection(&connection_tree(&["title"]), &first(2), None)
        .await
        .expect("connection");
    for node in &page.nodes {
        assert!(node.contains_key("title"));
        assert!(node.contains_key("id"), "cursor field is always selected");
        assert!(!node.contains_key("status"));
    }
    assert_eq!(page.edges.len(), 2);
}

#[tokio::test]
async fn empty_store_yields_an_empty_connection() {
    let resolver = ConnectionResolver::with_defaults(MemoryDatasource::new());
    let page = resolver
        .connection(&FieldTree::new(), &first(5), None)
        .await
        .expect("connection");
    assert!(page.edges.is_empty());
    assert!(page.nodes.is_empty());
    assert!(!page.page_info.has_next_page);
    assert!(!page.page_info.has_previous_page);
    assert_eq!(page.page_info.start_cursor, None);
    assert_eq!(page.page_info.end_cursor, None);
    assert_eq!(page.total_count, Some(0));
}

#[tokio::test]
async fn single_resolves_one_projected_record() {
    let resolver = resolver(5);
    let found = resolver
        .single(
            &leaf_tree(&["id", "title"]),
            FilterExpression::field("id", Condition::equals(3_i64)),
        )
        .await
        .expect("single")
        .expect("row expected");
    assert_eq!(found.get("id"), Some(&Value::Int(3)));
    assert_eq!(found.get("title"), Some(&Value::String("Post 3".into())));
    assert!(!found.contains_key("status"));
}

#[tokio::test]
async fn single_returns_none_when_nothing_matches() {
    let resolver = resolver(5);
    let found = resolver
        .single(
            &FieldTree::new(),
            FilterExpression::field("id", Condition::equals(99_i64)),
        )
        .await
        .expect("single");
    assert!(found.is_none());
}

struct FailingStore;

impl Datasource for FailingStore {
    fn find_many(
        &self,
        _args: FindManyArgs,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        async { Err(StoreError::Backend("replica unavailable".to_owned())) }
    }
}

struct CountFailingStore(MemoryDatasource);

impl Datasource for CountFailingStore {
    fn find_many(
        &self,
        args: FindManyArgs,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        self.0.find_many(args)
    }

    fn count(
        &self,
        _filter: Option<&FilterExpression>,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send {
        async { Err(StoreError::Backend("count timed out".to_owned())) }
    }
}

struct NoCountStore(MemoryDatasource);

impl Datasource for NoCountStore {
    fn find_many(
        &self,
        args: FindManyArgs,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        self.0.find_many(args)
    }
}

#[tokio::test]
async fn fetch_failure_is_fatal_and_carries_context() {
    let resolver = ConnectionResolver::with_defaults(FailingStore);
    let err = resolver
        .connection(&FieldTree::new(), &first(2), None)
        .await
        .expect_err("request should fail");
    match err {
        Error::Store { operation, source } => {
            assert_eq!(operation, "find_many");
            assert!(matches!(source, StoreError::Backend(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn count_failure_is_fatal_too() {
    let resolver = ConnectionResolver::with_defaults(CountFailingStore(seeded(3)));
    let err = resolver
        .connection(&FieldTree::new(), &first(2), None)
        .await
        .expect_err("request should fail");
    assert!(matches!(
        err,
        Error::Store {
            operation: "count",
            ..
        }
    ));
}

#[tokio::test]
async fn stores_without_count_report_no_total() {
    let resolver = ConnectionResolver::with_defaults(NoCountStore(seeded(3)));
    let page = resolver
        .connection(&FieldTree::new(), &first(2), None)
        .await
        .expect("connection");
    assert_eq!(page.total_count, None);
    assert_eq!(ids(&page), vec![3, 2]);
}
