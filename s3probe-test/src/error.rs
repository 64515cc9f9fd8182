//! Harness error types

use thiserror::Error;

/// Errors raised while provisioning, using, or tearing down a MinIO container
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("cannot create MinIO container: {0}")]
    Provision(String),

    #[error("unable to determine MinIO {what}: {reason}")]
    Address { what: &'static str, reason: String },

    #[error("MinIO at {url} did not become ready: {reason}")]
    Readiness { url: String, reason: String },

    #[error("cannot create MinIO client: {0}")]
    Client(String),

    #[error("{operation} failed: {reason}")]
    Operation { operation: String, reason: String },

    #[error("cannot terminate MinIO container {id}: {reason}")]
    Teardown { id: String, reason: String },
}

impl HarnessError {
    pub fn address(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Address {
            what,
            reason: reason.into(),
        }
    }

    pub fn operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_cause() {
        let err = HarnessError::address("port", "no binding for 9000/tcp");
        assert_eq!(
            err.to_string(),
            "unable to determine MinIO port: no binding for 9000/tcp"
        );

        let err = HarnessError::Teardown {
            id: "abc".to_string(),
            reason: "daemon gone".to_string(),
        };
        assert!(err.to_string().contains("daemon gone"));
        assert!(err.to_string().contains("abc"));
    }
}
