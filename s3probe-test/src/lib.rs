//! Disposable MinIO servers for S3 integration tests
//!
//! Provides everything a test needs to talk to a real object store:
//! - Start MinIO in a throwaway Docker container
//! - Wait for its health endpoint before handing out a client
//! - Build an S3 client bound to the container's mapped port
//! - Remove the container afterwards, even when the test panics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use s3probe_test::{run_with_minio, MinioConfig};
//!
//! #[tokio::test]
//! async fn test_list_buckets() {
//!     run_with_minio(&MinioConfig::default(), |client| async move {
//!         let buckets = client.list_buckets().send().await.unwrap();
//!         assert!(buckets.buckets().is_empty());
//!     })
//!     .await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod container;
pub mod error;
pub mod harness;
pub mod objects;
pub mod readiness;

pub use client::build_client;
pub use config::MinioConfig;
pub use container::{ContainerRuntime, DockerRuntime, Endpoint, MinioContainer};
pub use error::HarnessError;
pub use harness::{run_with_minio, MinioHarness};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test-friendly tracing subscriber.
///
/// Safe to call from every test; only the first call installs anything.
/// Honors `RUST_LOG` when set.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3probe_test=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
