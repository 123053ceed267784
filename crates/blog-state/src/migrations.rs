//! SurrealDB schema migrations and initialization
//!
//! Sets up the `posts` table with its fixed field set and the unique index on
//! the object id. Every statement is `IF NOT EXISTS`, so running it on each
//! connection is safe.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StateError;
use crate::Result;

/// Name of the table holding blog posts
pub const POSTS_TABLE: &str = "posts";

/// Initialize all tables
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing blog SurrealDB schema");

    init_posts_table(db).await?;

    info!("Blog schema initialization complete");
    Ok(())
}

/// Initialize `posts` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE posts {
///   oid:        STRING (24 lowercase hex chars, unique)
///   author_id:  STRING
///   content:    STRING
///   title:      STRING
/// }
/// ```
///
/// The record id of each row is `posts:⟨oid⟩`.
async fn init_posts_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing posts table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS posts SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS oid ON TABLE posts TYPE string;
        DEFINE FIELD IF NOT EXISTS author_id ON TABLE posts TYPE string;
        DEFINE FIELD IF NOT EXISTS content ON TABLE posts TYPE string;
        DEFINE FIELD IF NOT EXISTS title ON TABLE posts TYPE string;

        -- One document per object id
        DEFINE INDEX IF NOT EXISTS idx_post_oid ON TABLE posts COLUMNS oid UNIQUE;
    "#;

    db.query(sql)
        .await?
        .check()
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ posts table initialized");
    Ok(())
}
