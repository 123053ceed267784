//! Blog-State: document-store persistence for blog posts
//!
//! This crate owns every byte that goes to or comes from the document store.
//! The record service above it only sees the [`PostStore`] trait, typed
//! by-identifier queries, and raw [`PostRow`]s that it decodes itself.
//!
//! ## Key Components
//!
//! - `ObjectId`: 12-byte document identifier with a canonical hex form
//! - `PostStore`: insert / find-one / replace / delete / cursor abstraction
//! - `SurrealPostStore`: SurrealDB-backed implementation (memory, file, remote)
//! - `MemoryPostStore`: in-memory fake with fault injection, for tests

mod error;
pub mod fakes;
mod handle;
pub mod migrations;
mod object_id;
mod schema;
pub mod storage_traits;
pub mod surreal_store;

pub use error::{StateError, StorageError};
pub use handle::{connect, CloudConfig, StoreConfig, StoreLocation};
pub use object_id::ObjectId;
pub use schema::{PostContent, PostDocument, PostRow};
pub use storage_traits::{
    ByIdQuery, DeleteOutcome, DocumentCursor, InsertedId, PostCursor, PostStore,
    ReplaceOutcome, StorageResult,
};
pub use surreal_store::SurrealPostStore;

/// Result type for connection and schema operations
pub type Result<T> = std::result::Result<T, StateError>;
