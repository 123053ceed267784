//! Error types for blog-core

use thiserror::Error;
use tonic::{Code, Status};

/// Identifier and document decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Not a 24-character lowercase hex object id
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Construction errors for [`crate::PostService`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No document store was supplied
    #[error("a post store is required")]
    MissingStore,
}

/// Failures reported to callers of the record service.
///
/// Each kind maps onto exactly one gRPC status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller sent an identifier that does not parse
    #[error("{0}")]
    InvalidArgument(String),

    /// No post exists for the identifier
    #[error("{0}")]
    NotFound(String),

    /// Store, decoding or transport failure
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// gRPC status code for this failure
    pub fn code(&self) -> Code {
        match self {
            ServiceError::InvalidArgument(_) => Code::InvalidArgument,
            ServiceError::NotFound(_) => Code::NotFound,
            ServiceError::Internal(_) => Code::Internal,
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument(_) => "invalid_argument",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        Status::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_kind_to_its_status_code() {
        let cases = [
            (ServiceError::InvalidArgument("bad".into()), Code::InvalidArgument),
            (ServiceError::NotFound("gone".into()), Code::NotFound),
            (ServiceError::Internal("boom".into()), Code::Internal),
        ];
        for (err, code) in cases {
            let message = err.to_string();
            let status = Status::from(err);
            assert_eq!(status.code(), code);
            assert_eq!(status.message(), message);
        }
    }
}
