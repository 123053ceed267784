//! `grpc.health.v1.Health/Check`
//!
//! [`HealthReporter`] is shared between the process that owns the lifecycle
//! (marking services serving / not serving) and the [`HealthGrpc`] endpoint
//! that answers probes. The empty service name stands for the whole server.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tonic::{Request, Response, Status};

use crate::proto::health::health_check_response::ServingStatus;
use crate::proto::health::health_server::{Health, HealthServer};
use crate::proto::health::{HealthCheckRequest, HealthCheckResponse};

/// Fully-qualified name of the blog service, as used in health probes.
pub const BLOG_SERVICE_NAME: &str = "blog.BlogService";

/// Serving status per service name.
#[derive(Debug, Clone)]
pub struct HealthReporter {
    statuses: Arc<RwLock<HashMap<String, ServingStatus>>>,
}

impl Default for HealthReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthReporter {
    /// Both the server ("") and the blog service start out not serving.
    pub fn new() -> Self {
        let statuses = HashMap::from([
            (String::new(), ServingStatus::NotServing),
            (BLOG_SERVICE_NAME.to_string(), ServingStatus::NotServing),
        ]);
        Self {
            statuses: Arc::new(RwLock::new(statuses)),
        }
    }

    pub fn set_status(&self, service: &str, status: ServingStatus) {
        self.statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), status);
    }

    /// Mark the server and the blog service as serving.
    pub fn set_serving(&self) {
        self.set_status("", ServingStatus::Serving);
        self.set_status(BLOG_SERVICE_NAME, ServingStatus::Serving);
    }

    /// Mark the server and the blog service as not serving.
    pub fn set_not_serving(&self) {
        self.set_status("", ServingStatus::NotServing);
        self.set_status(BLOG_SERVICE_NAME, ServingStatus::NotServing);
    }

    /// Status of a registered service, `None` if the name is unknown.
    pub fn status(&self, service: &str) -> Option<ServingStatus> {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .copied()
    }
}

/// gRPC health endpoint.
#[derive(Debug, Clone)]
pub struct HealthGrpc {
    reporter: HealthReporter,
}

impl HealthGrpc {
    pub fn new(reporter: HealthReporter) -> Self {
        Self { reporter }
    }

    pub fn into_server(self) -> HealthServer<Self> {
        HealthServer::new(self)
    }
}

#[tonic::async_trait]
impl Health for HealthGrpc {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let service = request.into_inner().service;
        match self.reporter.status(&service) {
            Some(status) => Ok(Response::new(HealthCheckResponse {
                status: status as i32,
            })),
            None => Err(Status::not_found(format!("unknown service: {service}"))),
        }
    }
}
