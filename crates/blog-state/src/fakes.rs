//! In-memory fake for the post store (testing only)
//!
//! `MemoryPostStore` satisfies the [`PostStore`] contract without any external
//! dependencies. It also lets tests inject faults (backend errors, bogus
//! inserted ids, corrupt rows, a cursor that breaks mid-way) and observe how
//! many cursors are currently open.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::object_id::ObjectId;
use crate::schema::{PostContent, PostDocument, PostRow};
use crate::storage_traits::*;

/// Faults a [`MemoryPostStore`] should simulate.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// `insert_one` fails with a backend error
    pub fail_insert: bool,
    /// `insert_one` stores the row but reports an id that is not an object id
    pub bogus_inserted_id: bool,
    /// `find_one` fails with a backend error
    pub fail_find: bool,
    /// `replace_one` fails with a backend error
    pub fail_replace: bool,
    /// `replace_one` reports that nothing matched, even if the row exists
    pub replace_matches_nothing: bool,
    /// `delete_one` fails with a backend error
    pub fail_delete: bool,
    /// `find_all` fails before a cursor is opened
    pub fail_open_cursor: bool,
    /// The cursor yields this many rows, then a backend error
    pub fail_cursor_after: Option<usize>,
}

/// In-memory post store backed by a `BTreeMap<oid, row>`.
///
/// Rows are keyed by their hex id, so iteration follows id order, which for
/// generated ids is creation order.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    rows: Mutex<BTreeMap<String, PostRow>>,
    faults: Mutex<FaultPlan>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that simulates the given faults.
    pub fn with_faults(faults: FaultPlan) -> Self {
        let store = Self::default();
        store.set_faults(faults);
        store
    }

    /// Replace the active fault plan.
    pub fn set_faults(&self, faults: FaultPlan) {
        *lock(&self.faults) = faults;
    }

    /// Store a raw row as-is, bypassing id generation. Used to plant corrupt data.
    pub fn insert_raw(&self, row: PostRow) {
        lock(&self.rows).insert(row.oid.clone(), row);
    }

    /// Store a raw row under `key`, whatever its own `oid` says.
    pub fn insert_raw_at(&self, key: &str, row: PostRow) {
        lock(&self.rows).insert(key.to_string(), row);
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursors opened by `find_all` that have not been dropped yet.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn faults(&self) -> FaultPlan {
        lock(&self.faults).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(op: &str) -> StorageError {
    StorageError::Backend(format!("injected {op} failure"))
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert_one(&self, content: PostContent) -> StorageResult<InsertedId> {
        let faults = self.faults();
        if faults.fail_insert {
            return Err(injected("insert"));
        }

        let id = ObjectId::new();
        let row = PostDocument::from_content(id, content).to_row();
        lock(&self.rows).insert(row.oid.clone(), row);

        if faults.bogus_inserted_id {
            return Ok(InsertedId(format!("posts:{}", id.timestamp_secs())));
        }
        Ok(InsertedId(id.to_hex()))
    }

    async fn find_one(&self, query: &ByIdQuery) -> StorageResult<Option<PostRow>> {
        if self.faults().fail_find {
            return Err(injected("find"));
        }
        Ok(lock(&self.rows).get(&query.id().to_hex()).cloned())
    }

    async fn replace_one(
        &self,
        query: &ByIdQuery,
        document: &PostDocument,
    ) -> StorageResult<ReplaceOutcome> {
        let faults = self.faults();
        if faults.fail_replace {
            return Err(injected("replace"));
        }
        if faults.replace_matches_nothing {
            return Ok(ReplaceOutcome::default());
        }

        let mut rows = lock(&self.rows);
        let Some(existing) = rows.get_mut(&query.id().to_hex()) else {
            return Ok(ReplaceOutcome::default());
        };

        let mut replacement = document.to_row();
        // The query decides which document is replaced; its id is kept.
        replacement.oid = existing.oid.clone();
        let modified = u64::from(*existing != replacement);
        *existing = replacement;

        Ok(ReplaceOutcome {
            matched_count: 1,
            modified_count: modified,
        })
    }

    async fn delete_one(&self, query: &ByIdQuery) -> StorageResult<DeleteOutcome> {
        if self.faults().fail_delete {
            return Err(injected("delete"));
        }
        let removed = lock(&self.rows).remove(&query.id().to_hex());
        Ok(DeleteOutcome {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn find_all(&self) -> StorageResult<PostCursor> {
        let faults = self.faults();
        if faults.fail_open_cursor {
            return Err(injected("find_all"));
        }

        let pending: VecDeque<PostRow> = lock(&self.rows).values().cloned().collect();
        self.open_cursors.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryCursor {
            pending,
            yielded: 0,
            fail_after: faults.fail_cursor_after,
            failed: false,
            _guard: CursorGuard(Arc::clone(&self.open_cursors)),
        }))
    }
}

/// Decrements the open-cursor count when the cursor goes away.
#[derive(Debug)]
struct CursorGuard(Arc<AtomicUsize>);

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cursor over a snapshot of the rows taken when it was opened.
#[derive(Debug)]
struct MemoryCursor {
    pending: VecDeque<PostRow>,
    yielded: usize,
    fail_after: Option<usize>,
    failed: bool,
    _guard: CursorGuard,
}

#[async_trait]
impl DocumentCursor for MemoryCursor {
    async fn next(&mut self) -> Option<StorageResult<PostRow>> {
        if self.failed {
            return None;
        }
        if self.fail_after == Some(self.yielded) {
            self.failed = true;
            return Some(Err(injected("cursor")));
        }

        let row = self.pending.pop_front()?;
        self.yielded += 1;
        Some(Ok(row))
    }
}
