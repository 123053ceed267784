//! SurrealDB-backed PostStore implementation
//!
//! Each post is stored as `posts:⟨oid⟩` with the hex object id repeated in the
//! `oid` field. Lookups go through the unique `oid` index. Reads project the
//! four stored fields and decode them separately from the query, so a row
//! that no longer has the expected shape surfaces as [`StorageError::Decode`]
//! instead of a backend failure.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::handle::{self, StoreConfig};
use crate::migrations::POSTS_TABLE;
use crate::object_id::ObjectId;
use crate::schema::{PostContent, PostDocument, PostRow};
use crate::storage_traits::{
    ByIdQuery, DeleteOutcome, DocumentCursor, InsertedId, PostCursor, PostStore, ReplaceOutcome,
    StorageResult,
};

const FIND_ONE: &str =
    "SELECT oid, author_id, content, title FROM posts WHERE oid = $oid LIMIT 1";
const FIRST_PAGE: &str =
    "SELECT oid, author_id, content, title FROM posts ORDER BY oid ASC LIMIT $limit";
const NEXT_PAGE: &str = "SELECT oid, author_id, content, title FROM posts \
     WHERE oid > $after ORDER BY oid ASC LIMIT $limit";

/// SurrealDB-backed implementation of [`PostStore`].
#[derive(Clone)]
pub struct SurrealPostStore {
    db: Surreal<Any>,
    batch_size: usize,
}

impl SurrealPostStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `blog/main`, and runs `init_schema`.
    pub async fn in_memory() -> crate::Result<Self> {
        let store = Self::connect(&StoreConfig::in_memory()).await?;
        info!("SurrealPostStore connected (in-memory)");
        Ok(store)
    }

    /// Connect with an explicit configuration.
    pub async fn connect(config: &StoreConfig) -> crate::Result<Self> {
        let db = handle::connect(config).await?;
        Ok(Self {
            db,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Create from environment variables (see [`StoreConfig::from_env`]).
    pub async fn from_env() -> crate::Result<Self> {
        Self::connect(&StoreConfig::from_env()).await
    }

    /// Check that the backend is reachable.
    pub async fn ping(&self) -> StorageResult<()> {
        self.db.health().await?;
        Ok(())
    }
}

/// Decode a projected row.
fn decode_row(raw: Value) -> StorageResult<PostRow> {
    serde_json::from_value(raw).map_err(|e| StorageError::Decode(e.to_string()))
}

#[async_trait]
impl PostStore for SurrealPostStore {
    async fn insert_one(&self, content: PostContent) -> StorageResult<InsertedId> {
        let id = ObjectId::new();
        let row = PostDocument::from_content(id, content).to_row();

        debug!(oid = %id, "inserting post");

        let mut res = self
            .db
            .query("CREATE type::thing($tb, $oid) CONTENT $row")
            .bind(("tb", POSTS_TABLE))
            .bind(("oid", row.oid.clone()))
            .bind(("row", row))
            .await?;

        let created: Vec<PostRow> = res.take(0)?;
        created
            .into_iter()
            .next()
            .map(|row| InsertedId(row.oid))
            .ok_or_else(|| StorageError::Backend("insert returned no record".to_string()))
    }

    async fn find_one(&self, query: &ByIdQuery) -> StorageResult<Option<PostRow>> {
        let oid = query.id().to_hex();
        debug!(oid = %oid, "finding post");

        let mut res = self.db.query(FIND_ONE).bind(("oid", oid)).await?;
        let rows: Vec<Value> = res.take(0)?;

        rows.into_iter().next().map(decode_row).transpose()
    }

    async fn replace_one(
        &self,
        query: &ByIdQuery,
        document: &PostDocument,
    ) -> StorageResult<ReplaceOutcome> {
        let oid = query.id().to_hex();
        let mut row = document.to_row();
        row.oid = oid.clone();

        debug!(oid = %oid, "replacing post");

        let mut res = self
            .db
            .query("UPDATE posts CONTENT $row WHERE oid = $oid")
            .bind(("row", row))
            .bind(("oid", oid))
            .await?;

        let updated: Vec<PostRow> = res.take(0)?;
        let count = updated.len() as u64;
        Ok(ReplaceOutcome {
            matched_count: count,
            modified_count: count,
        })
    }

    async fn delete_one(&self, query: &ByIdQuery) -> StorageResult<DeleteOutcome> {
        let oid = query.id().to_hex();
        debug!(oid = %oid, "deleting post");

        let mut res = self
            .db
            .query("DELETE posts WHERE oid = $oid RETURN BEFORE")
            .bind(("oid", oid))
            .await?;

        let deleted: Vec<PostRow> = res.take(0)?;
        Ok(DeleteOutcome {
            deleted_count: deleted.len() as u64,
        })
    }

    async fn find_all(&self) -> StorageResult<PostCursor> {
        debug!(batch_size = self.batch_size, "opening post cursor");
        Ok(Box::new(SurrealPostCursor {
            db: self.db.clone(),
            batch_size: self.batch_size,
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
            failed: false,
        }))
    }
}

/// Keyset-paginated cursor over `posts`, ordered by `oid`.
///
/// Holds at most one batch in memory. Rows created after the cursor passed
/// their position are not seen.
pub struct SurrealPostCursor {
    db: Surreal<Any>,
    batch_size: usize,
    after: Option<String>,
    buffer: VecDeque<Value>,
    exhausted: bool,
    failed: bool,
}

impl SurrealPostCursor {
    async fn fetch_batch(&mut self) -> StorageResult<()> {
        let query = match &self.after {
            None => self.db.query(FIRST_PAGE).bind(("limit", self.batch_size)),
            Some(after) => self
                .db
                .query(NEXT_PAGE)
                .bind(("limit", self.batch_size))
                .bind(("after", after.clone())),
        };

        let mut res = query.await?;
        let rows: Vec<Value> = res.take(0)?;

        if rows.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some(last) = rows
            .iter()
            .rev()
            .find_map(|raw| raw.get("oid").and_then(Value::as_str))
        {
            self.after = Some(last.to_string());
        } else if !rows.is_empty() {
            // Nothing to page from; stop after this batch.
            self.exhausted = true;
        }

        self.buffer.extend(rows);
        Ok(())
    }
}

#[async_trait]
impl DocumentCursor for SurrealPostCursor {
    async fn next(&mut self) -> Option<StorageResult<PostRow>> {
        if self.failed {
            return None;
        }
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_batch().await {
                self.failed = true;
                return Some(Err(e));
            }
        }

        let raw = self.buffer.pop_front()?;
        Some(decode_row(raw))
    }
}

impl Drop for SurrealPostCursor {
    fn drop(&mut self) {
        debug!(
            buffered = self.buffer.len(),
            exhausted = self.exhausted,
            "post cursor released"
        );
    }
}
