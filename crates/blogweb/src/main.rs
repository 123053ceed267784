//! blogweb: HTTP health-check relay in front of `blogd`.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use blogweb::{routes, GrpcHealthProbe, HealthProbe};
use clap::Parser;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "blogweb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP health-check relay for the blog service", long_about = None)]
struct Args {
    /// Address to serve HTTP on
    #[arg(long, env = "BLOGWEB_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    listen: SocketAddr,

    /// gRPC address of the blog server
    #[arg(long, env = "BLOG_ADDR", default_value = "http://127.0.0.1:50051")]
    grpc_addr: String,

    /// Service name sent in health checks (empty: the whole server)
    #[arg(long, default_value = "")]
    service: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    blog_core::init_tracing(args.json, level);
    info!(event = "blogweb.started", "Start blog web");

    let probe = GrpcHealthProbe::connect_lazy(&args.grpc_addr, args.service.clone())
        .with_context(|| format!("Invalid gRPC address {}", args.grpc_addr))?;
    let probe: web::Data<dyn HealthProbe> = web::Data::from(Arc::new(probe) as Arc<dyn HealthProbe>);

    let server = HttpServer::new(move || App::new().app_data(probe.clone()).configure(routes))
        .bind(args.listen)
        .with_context(|| format!("Failed to bind {}", args.listen))?;

    info!(event = "blogweb.listening", addr = %args.listen, grpc = %args.grpc_addr, "Serving /healthcheck");
    server.run().await.context("HTTP server failed")
}
