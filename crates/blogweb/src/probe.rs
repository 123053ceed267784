//! Health probe port and its gRPC adapter.

use async_trait::async_trait;
use blog_core::proto::health::health_check_response::ServingStatus;
use blog_core::proto::health::health_client::HealthClient;
use blog_core::proto::health::HealthCheckRequest;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("invalid health endpoint: {0}")]
    Endpoint(#[from] tonic::transport::Error),

    #[error("health check failed: {0}")]
    Rpc(#[from] tonic::Status),
}

/// Asks some backend whether it is serving.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> Result<ServingStatus, ProbeError>;
}

/// Probe backed by `grpc.health.v1.Health/Check`.
#[derive(Debug, Clone)]
pub struct GrpcHealthProbe {
    client: HealthClient<Channel>,
    service: String,
}

impl GrpcHealthProbe {
    /// Probe `service` at `addr`. The connection is made on first use, so the
    /// relay can start before the server does.
    pub fn connect_lazy(addr: &str, service: impl Into<String>) -> Result<Self, ProbeError> {
        let channel = Endpoint::from_shared(addr.to_string())?.connect_lazy();
        Ok(Self {
            client: HealthClient::new(channel),
            service: service.into(),
        })
    }
}

#[async_trait]
impl HealthProbe for GrpcHealthProbe {
    async fn check(&self) -> Result<ServingStatus, ProbeError> {
        let mut client = self.client.clone();
        let response = client
            .check(HealthCheckRequest {
                service: self.service.clone(),
            })
            .await?;
        Ok(response.into_inner().status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_address() {
        let err = GrpcHealthProbe::connect_lazy("not a uri", "").unwrap_err();
        assert!(matches!(err, ProbeError::Endpoint(_)));
    }
}
