//! Blog Web: HTTP relay for the gRPC health service
//!
//! `GET /healthcheck` asks the blog server's `grpc.health.v1.Health/Check`
//! and answers with a plain-text `SERVING` or `UNKNOWN`.

pub mod health;
pub mod probe;

pub use health::{healthcheck, routes};
pub use probe::{GrpcHealthProbe, HealthProbe, ProbeError};
