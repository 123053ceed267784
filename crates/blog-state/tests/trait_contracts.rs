//! Trait contract tests for PostStore.
//!
//! Every check runs against both the in-memory fake and the SurrealDB
//! implementation (in-memory engine). Any conforming implementation must pass.

use std::collections::HashSet;

use blog_state::fakes::MemoryPostStore;
use blog_state::{
    ByIdQuery, DocumentCursor, ObjectId, PostContent, PostDocument, PostRow, PostStore,
    StoreConfig, SurrealPostStore,
};

fn sample(i: usize) -> PostContent {
    PostContent::new(format!("author-{i}"), format!("title {i}"), format!("body {i}"))
}

async fn surreal() -> SurrealPostStore {
    SurrealPostStore::in_memory().await.unwrap()
}

/// Small batch size so draining a cursor crosses several pages.
async fn surreal_paged() -> SurrealPostStore {
    SurrealPostStore::connect(&StoreConfig::in_memory().with_batch_size(2))
        .await
        .unwrap()
}

async fn drain(store: &dyn PostStore) -> Vec<PostRow> {
    let mut cursor = store.find_all().await.unwrap();
    let mut rows = Vec::new();
    while let Some(row) = cursor.next().await {
        rows.push(row.unwrap());
    }
    rows
}

// ===========================================================================
// Shared contracts
// ===========================================================================

async fn insert_assigns_parseable_unique_ids(store: &dyn PostStore) {
    let a = store.insert_one(sample(1)).await.unwrap();
    let b = store.insert_one(sample(2)).await.unwrap();

    let a = ObjectId::parse_str(&a.0).unwrap();
    let b = ObjectId::parse_str(&b.0).unwrap();
    assert_ne!(a, b);
}

async fn find_one_returns_inserted_row(store: &dyn PostStore) {
    let inserted = store.insert_one(sample(7)).await.unwrap();
    let id = ObjectId::parse_str(&inserted.0).unwrap();

    let row = store
        .find_one(&ByIdQuery::new(id))
        .await
        .unwrap()
        .expect("row should exist");

    assert_eq!(row.oid, inserted.0);
    assert_eq!(row.author_id, "author-7");
    assert_eq!(row.title, "title 7");
    assert_eq!(row.content, "body 7");
}

async fn find_one_missing_is_none(store: &dyn PostStore) {
    let missing = ByIdQuery::new(ObjectId::new());
    assert!(store.find_one(&missing).await.unwrap().is_none());
}

async fn replace_rewrites_fields_keeps_id(store: &dyn PostStore) {
    let inserted = store.insert_one(sample(1)).await.unwrap();
    let id = ObjectId::parse_str(&inserted.0).unwrap();
    let query = ByIdQuery::new(id);

    let updated = PostDocument::from_content(id, PostContent::new("new-author", "new", "text"));
    let outcome = store.replace_one(&query, &updated).await.unwrap();
    assert_eq!(outcome.matched_count, 1);

    let row = store.find_one(&query).await.unwrap().unwrap();
    assert_eq!(row.oid, inserted.0);
    assert_eq!(row.author_id, "new-author");
    assert_eq!(row.title, "new");
    assert_eq!(row.content, "text");
}

async fn replace_missing_matches_nothing_and_creates_nothing(store: &dyn PostStore) {
    let id = ObjectId::new();
    let query = ByIdQuery::new(id);
    let doc = PostDocument::from_content(id, sample(1));

    let outcome = store.replace_one(&query, &doc).await.unwrap();
    assert_eq!(outcome.matched_count, 0);
    assert!(store.find_one(&query).await.unwrap().is_none());
}

async fn delete_counts_removed_documents(store: &dyn PostStore) {
    let inserted = store.insert_one(sample(1)).await.unwrap();
    let query = ByIdQuery::new(ObjectId::parse_str(&inserted.0).unwrap());

    assert_eq!(store.delete_one(&query).await.unwrap().deleted_count, 1);
    assert_eq!(store.delete_one(&query).await.unwrap().deleted_count, 0);
    assert!(store.find_one(&query).await.unwrap().is_none());
}

async fn cursor_on_empty_store_is_exhausted(store: &dyn PostStore) {
    assert!(drain(store).await.is_empty());
}

async fn cursor_yields_every_row_once(store: &dyn PostStore) {
    let mut expected = HashSet::new();
    for i in 0..7 {
        expected.insert(store.insert_one(sample(i)).await.unwrap().0);
    }

    let rows = drain(store).await;
    assert_eq!(rows.len(), 7);
    let seen: HashSet<String> = rows.into_iter().map(|r| r.oid).collect();
    assert_eq!(seen, expected);
}

// ===========================================================================
// MemoryPostStore
// ===========================================================================

#[tokio::test]
async fn memory_insert_assigns_parseable_unique_ids() {
    insert_assigns_parseable_unique_ids(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_find_one_returns_inserted_row() {
    find_one_returns_inserted_row(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_find_one_missing_is_none() {
    find_one_missing_is_none(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_replace_rewrites_fields_keeps_id() {
    replace_rewrites_fields_keeps_id(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_replace_missing_matches_nothing() {
    replace_missing_matches_nothing_and_creates_nothing(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_delete_counts_removed_documents() {
    delete_counts_removed_documents(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_cursor_on_empty_store_is_exhausted() {
    cursor_on_empty_store_is_exhausted(&MemoryPostStore::new()).await;
}

#[tokio::test]
async fn memory_cursor_yields_every_row_once() {
    let store = MemoryPostStore::new();
    cursor_yields_every_row_once(&store).await;
    assert_eq!(store.open_cursors(), 0);
}

// ===========================================================================
// SurrealPostStore
// ===========================================================================

#[tokio::test]
async fn surreal_insert_assigns_parseable_unique_ids() {
    insert_assigns_parseable_unique_ids(&surreal().await).await;
}

#[tokio::test]
async fn surreal_find_one_returns_inserted_row() {
    find_one_returns_inserted_row(&surreal().await).await;
}

#[tokio::test]
async fn surreal_find_one_missing_is_none() {
    find_one_missing_is_none(&surreal().await).await;
}

#[tokio::test]
async fn surreal_replace_rewrites_fields_keeps_id() {
    replace_rewrites_fields_keeps_id(&surreal().await).await;
}

#[tokio::test]
async fn surreal_replace_missing_matches_nothing() {
    replace_missing_matches_nothing_and_creates_nothing(&surreal().await).await;
}

#[tokio::test]
async fn surreal_delete_counts_removed_documents() {
    delete_counts_removed_documents(&surreal().await).await;
}

#[tokio::test]
async fn surreal_cursor_on_empty_store_is_exhausted() {
    cursor_on_empty_store_is_exhausted(&surreal().await).await;
}

#[tokio::test]
async fn surreal_cursor_yields_every_row_once() {
    cursor_yields_every_row_once(&surreal().await).await;
}

#[tokio::test]
async fn surreal_cursor_pages_across_batches() {
    cursor_yields_every_row_once(&surreal_paged().await).await;
}

#[tokio::test]
async fn surreal_ping_succeeds_in_memory() {
    surreal().await.ping().await.unwrap();
}
