//! S3 client construction

use crate::config::MinioConfig;
use crate::error::HarnessError;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use tracing::debug;
use url::Url;

/// Build an S3 client for the server at `endpoint`.
///
/// The endpoint must be plain `http://`; test containers don't serve TLS.
/// Credentials are the config's root user and password, and requests use
/// path-style addressing since container hosts have no bucket DNS.
pub async fn build_client(endpoint: &str, config: &MinioConfig) -> Result<Client, HarnessError> {
    let url = Url::parse(endpoint)
        .map_err(|e| HarnessError::Client(format!("invalid endpoint {}: {}", endpoint, e)))?;
    if url.scheme() != "http" {
        return Err(HarnessError::Client(format!(
            "expected an http:// endpoint, got {}",
            endpoint
        )));
    }
    if url.host_str().is_none() {
        return Err(HarnessError::Client(format!(
            "endpoint {} has no host",
            endpoint
        )));
    }

    let credentials = Credentials::new(
        config.root_user.clone(),
        config.root_password.clone(),
        None,
        None,
        "s3probe",
    );

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();

    debug!(endpoint = %endpoint, "Built S3 client");

    Ok(Client::from_conf(s3_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_tls_endpoint() {
        let result = build_client("https://localhost:9000", &MinioConfig::default()).await;
        assert!(matches!(result, Err(HarnessError::Client(_))));
    }

    #[tokio::test]
    async fn test_rejects_malformed_endpoint() {
        let result = build_client("localhost 9000", &MinioConfig::default()).await;
        assert!(matches!(result, Err(HarnessError::Client(_))));
    }

    #[tokio::test]
    async fn test_builds_for_http_endpoint() {
        let client = build_client("http://127.0.0.1:9000", &MinioConfig::default())
            .await
            .unwrap();
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some("us-east-1")
        );
    }
}
