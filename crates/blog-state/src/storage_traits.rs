//! Storage trait definitions for blog posts
//!
//! `PostStore` is the only door into the document store. It mirrors the small
//! set of operations a document database offers for a single collection:
//! insert one, find one, replace one, delete one, and a cursor over all.
//!
//! All traits are async and backend-agnostic. An in-memory fake is provided
//! for testing via the `fakes` module.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::object_id::ObjectId;
use crate::schema::{PostContent, PostDocument, PostRow};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Lookup of exactly one post by its identifier.
///
/// Built from a typed [`ObjectId`]; each backend translates it into its own
/// query syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByIdQuery {
    id: ObjectId,
}

impl ByIdQuery {
    pub fn new(id: ObjectId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

/// Identifier returned by an insert, as the backend reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedId(pub String);

impl std::fmt::Display for InsertedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a replace-by-id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    /// Documents that matched the query (0 or 1)
    pub matched_count: u64,
    /// Documents actually rewritten
    pub modified_count: u64,
}

/// Outcome of a delete-by-id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Sequential, one-at-a-time iterator over stored rows.
///
/// Dropping the cursor releases whatever the backend holds for it.
#[async_trait]
pub trait DocumentCursor: Send {
    /// Advance to the next row. `None` once the cursor is exhausted; after an
    /// `Err` the cursor should not be polled again.
    async fn next(&mut self) -> Option<StorageResult<PostRow>>;
}

/// Boxed cursor handed out by [`PostStore::find_all`].
pub type PostCursor = Box<dyn DocumentCursor>;

/// Single-collection document store for blog posts.
///
/// Guarantees:
/// - `insert_one` assigns a fresh, unique id and returns it.
/// - `find_one`, `replace_one` and `delete_one` touch at most one document.
/// - `replace_one` never creates a document; an absent target yields
///   `matched_count == 0`.
/// - `find_all` yields every stored row exactly once, in store-defined order.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post, returning the id the store assigned.
    async fn insert_one(&self, content: PostContent) -> StorageResult<InsertedId>;

    /// Fetch the row matching the query, if any.
    async fn find_one(&self, query: &ByIdQuery) -> StorageResult<Option<PostRow>>;

    /// Replace the whole document matching the query.
    async fn replace_one(
        &self,
        query: &ByIdQuery,
        document: &PostDocument,
    ) -> StorageResult<ReplaceOutcome>;

    /// Delete the document matching the query.
    async fn delete_one(&self, query: &ByIdQuery) -> StorageResult<DeleteOutcome>;

    /// Open a cursor over every stored post.
    async fn find_all(&self) -> StorageResult<PostCursor>;
}
