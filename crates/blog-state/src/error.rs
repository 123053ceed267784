//! Error types for blog-state

use thiserror::Error;

/// Errors raised while opening the store or preparing its schema
#[derive(Error, Debug)]
pub enum StateError {
    /// Endpoint unreachable, sign-in rejected or namespace not selectable
    #[error("cannot open document store: {0}")]
    Connection(String),

    /// A setup statement was rejected by the backend
    #[error("store query rejected: {0}")]
    Query(String),

    /// Table, field or index definitions could not be applied
    #[error("cannot prepare schema: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Query(err.to_string())
    }
}

/// Errors surfaced by [`crate::PostStore`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A string that is not 24 lowercase hex characters was offered as an id
    #[error("invalid object id: {value:?}")]
    InvalidObjectId { value: String },

    /// A stored row could not be read back into its expected shape
    #[error("failed to decode stored document: {0}")]
    Decode(String),

    /// Anything the backend itself reported (connectivity, query, constraint)
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
