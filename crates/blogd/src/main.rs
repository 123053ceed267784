//! blogd: gRPC server for blog posts
//!
//! Connects the document store, registers `blog.BlogService` together with
//! `grpc.health.v1.Health`, and serves until SIGINT or SIGTERM.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use blog_core::{BlogGrpc, HealthGrpc, HealthReporter, PostService};
use blog_state::{PostStore, StoreConfig, SurrealPostStore};
use clap::Parser;
use tokio::signal;
use tonic::transport::Server;
use tracing::{error, info, info_span, Level};

#[derive(Parser, Debug)]
#[command(name = "blogd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Blog record service (gRPC)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BLOG_LISTEN_ADDR", default_value = "0.0.0.0:50051")]
    listen: SocketAddr,

    /// SurrealDB URL; overrides the SURREALDB_* environment
    #[arg(long, env = "BLOG_DB_URL")]
    db_url: Option<String>,

    /// Keep posts in memory only (nothing survives a restart)
    #[arg(long)]
    in_memory: bool,

    /// Rows fetched per round trip while listing
    #[arg(long)]
    batch_size: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Args {
    /// `--in-memory` wins over `--db-url`, which wins over the environment.
    fn store_config(&self) -> StoreConfig {
        let config = if self.in_memory {
            StoreConfig::in_memory()
        } else if let Some(url) = &self.db_url {
            StoreConfig::url(url.clone())
        } else {
            StoreConfig::from_env()
        };

        match self.batch_size {
            Some(size) => config.with_batch_size(size),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    blog_core::init_tracing(args.json, level);
    info!(event = "blogd.started", "Blog service started");

    let config = args.store_config();
    let store = SurrealPostStore::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to document store at {}", config.endpoint()))?;

    serve(
        args.listen,
        Arc::new(store),
        HealthReporter::new(),
        shutdown_signal(),
    )
    .await?;

    info!(event = "blogd.stopped", "End of program");
    Ok(())
}

/// Serve the blog and health services on `addr` until `shutdown` resolves.
///
/// `reporter` is flipped to serving once the services are registered and back
/// to not serving as soon as shutdown begins.
async fn serve<F>(
    addr: SocketAddr,
    store: Arc<dyn PostStore>,
    reporter: HealthReporter,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let service = PostService::builder()
        .store(store)
        .span(info_span!("blog_service"))
        .build()
        .context("Failed to create blog service")?;

    let blog = BlogGrpc::new(service).into_server();
    let health = HealthGrpc::new(reporter.clone()).into_server();
    reporter.set_serving();

    info!(event = "blogd.listening", %addr, "Starting gRPC server");
    Server::builder()
        .add_service(blog)
        .add_service(health)
        .serve_with_shutdown(addr, async move {
            shutdown.await;
            reporter.set_not_serving();
            info!(event = "blogd.stopping", "Stopping the server");
        })
        .await
        .with_context(|| format!("Failed to serve on {addr}"))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => error!("failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
