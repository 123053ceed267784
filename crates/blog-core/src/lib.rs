//! Blog Core: record codec, record service and gRPC surface
//!
//! ## Layers
//!
//! - [`codec`]: wire `Blog` messages ⇄ persisted `PostDocument`s
//! - [`service`]: create / read / update / delete / list against a `PostStore`
//! - [`grpc`]: tonic adapter for `blog.BlogService`
//! - [`health`]: `grpc.health.v1.Health/Check`
//!
//! Binaries call [`init_tracing`] once at startup.

pub mod proto {
    //! Generated protobuf types and service traits.

    pub mod blog {
        tonic::include_proto!("blog");
    }

    pub mod health {
        tonic::include_proto!("grpc.health.v1");
    }
}

pub mod codec;
mod error;
pub mod grpc;
pub mod health;
pub mod obs;
pub mod service;
pub mod telemetry;

pub use error::{CodecError, ConfigError, ServiceError};
pub use grpc::BlogGrpc;
pub use health::{HealthGrpc, HealthReporter, BLOG_SERVICE_NAME};
pub use proto::blog::Blog;
pub use service::{PostService, PostServiceBuilder, RecordSink, SinkClosed};
pub use telemetry::init_tracing;

/// Result type for record service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
