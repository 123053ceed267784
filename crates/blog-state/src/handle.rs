//! SurrealDB connection configuration
//!
//! Supports in-memory, local file (SurrealKV), plain URL and cloud
//! (WebSocket with sign-in) connections. [`connect`] hands back a ready
//! `Surreal<Any>` with the namespace selected and the schema initialized.

use std::path::PathBuf;

use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{info, instrument, warn};

use crate::error::StateError;
use crate::migrations;
use crate::Result;

/// Remote instance that requires a sign-in.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// `ws://` or `wss://` URL of the instance
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Sign in as a root user instead of a database user
    pub is_root: bool,
}

impl CloudConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            is_root: false,
        }
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// `SURREALDB_ENDPOINT`, `SURREALDB_USERNAME` and `SURREALDB_PASSWORD`
    /// must all be set; `SURREALDB_ROOT=true` (or `1`) selects root sign-in.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok();
        let root = var("SURREALDB_ROOT")
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        Some(
            Self::new(
                var("SURREALDB_ENDPOINT")?,
                var("SURREALDB_USERNAME")?,
                var("SURREALDB_PASSWORD")?,
            )
            .with_root(root),
        )
    }
}

/// Where the store lives
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// Process-local, discarded on exit
    Memory,
    /// SurrealKV files under the given directory
    Local(PathBuf),
    /// Any unauthenticated SurrealDB URL (`ws://`, `mem://`, ...)
    Url(String),
    /// Authenticated remote instance
    Cloud(CloudConfig),
}

/// Store connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Namespace (default: "blog")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Rows fetched per round trip while a cursor is being drained
    pub batch_size: usize,
}

impl StoreConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "blog";
    pub const DEFAULT_DATABASE: &'static str = "main";
    pub const DEFAULT_BATCH_SIZE: usize = 64;
    pub const DEFAULT_LOCAL_PATH: &'static str = ".blog/db";

    fn at(location: StoreLocation) -> Self {
        Self {
            location,
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            database: Self::DEFAULT_DATABASE.to_string(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }

    pub fn in_memory() -> Self {
        Self::at(StoreLocation::Memory)
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::at(StoreLocation::Local(path.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::at(StoreLocation::Url(url.into()))
    }

    pub fn cloud(config: CloudConfig) -> Self {
        Self::at(StoreLocation::Cloud(config))
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Set the cursor batch size. Zero is bumped to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Build from environment variables
    ///
    /// If SURREALDB_ENDPOINT (plus credentials) is set, connects to cloud.
    /// If SURREALDB_URL is set, connects to that URL.
    /// Otherwise, falls back to local persistence in `.blog/db`.
    ///
    /// SURREALDB_NAMESPACE, SURREALDB_DATABASE and BLOG_CURSOR_BATCH_SIZE
    /// override the defaults.
    pub fn from_env() -> Self {
        let mut config = if let Some(cloud) = CloudConfig::from_env() {
            Self::cloud(cloud)
        } else if let Ok(url) = std::env::var("SURREALDB_URL") {
            Self::url(url)
        } else {
            Self::local(Self::DEFAULT_LOCAL_PATH)
        };

        if let Ok(ns) = std::env::var("SURREALDB_NAMESPACE") {
            config = config.with_namespace(ns);
        }
        if let Ok(db) = std::env::var("SURREALDB_DATABASE") {
            config = config.with_database(db);
        }
        if let Ok(raw) = std::env::var("BLOG_CURSOR_BATCH_SIZE") {
            match raw.parse::<usize>() {
                Ok(size) => config = config.with_batch_size(size),
                Err(_) => warn!(value = %raw, "ignoring unparsable BLOG_CURSOR_BATCH_SIZE"),
            }
        }
        config
    }

    /// Connection URL handed to the SurrealDB engine.
    pub fn endpoint(&self) -> String {
        match &self.location {
            StoreLocation::Memory => "mem://".to_string(),
            StoreLocation::Local(path) => format!("surrealkv://{}", path.display()),
            StoreLocation::Url(url) => url.clone(),
            StoreLocation::Cloud(cloud) => cloud.endpoint.clone(),
        }
    }
}

/// Open a connection, authenticate if needed, select namespace/database and
/// initialize the schema.
#[instrument(skip(config), fields(endpoint = %config.endpoint(), namespace = %config.namespace, database = %config.database))]
pub async fn connect(config: &StoreConfig) -> Result<Surreal<Any>> {
    if let StoreLocation::Local(path) = &config.location {
        std::fs::create_dir_all(path).map_err(|e| {
            StateError::Connection(format!("cannot create {}: {e}", path.display()))
        })?;
    }

    let endpoint = config.endpoint();
    let db = surrealdb::engine::any::connect(endpoint.as_str())
        .await
        .map_err(|e| StateError::Connection(format!("cannot reach {endpoint}: {e}")))?;

    if let StoreLocation::Cloud(cloud) = &config.location {
        sign_in(&db, cloud, config).await?;
    }

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| {
            StateError::Connection(format!(
                "cannot select {}/{}: {e}",
                config.namespace, config.database
            ))
        })?;

    migrations::init_schema(&db).await?;

    info!(event = "store.connected", "document store ready");
    Ok(db)
}

async fn sign_in(db: &Surreal<Any>, cloud: &CloudConfig, config: &StoreConfig) -> Result<()> {
    let outcome = if cloud.is_root {
        db.signin(Root {
            username: &cloud.username,
            password: &cloud.password,
        })
        .await
    } else {
        db.signin(Database {
            namespace: &config.namespace,
            database: &config.database,
            username: &cloud.username,
            password: &cloud.password,
        })
        .await
    };

    outcome.map(drop).map_err(|e| {
        let who = if cloud.is_root { "root" } else { "database" };
        StateError::Connection(format!("{who} sign-in as {} failed: {e}", cloud.username))
    })
}
