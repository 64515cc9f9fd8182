//! Scoped MinIO lifecycle around a test body

use crate::client::build_client;
use crate::config::MinioConfig;
use crate::container::{ContainerRuntime, DockerRuntime, MinioContainer};
use crate::error::HarnessError;
use crate::readiness::wait_ready;
use aws_sdk_s3::Client;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs test bodies against a freshly provisioned MinIO container each time
pub struct MinioHarness {
    config: MinioConfig,
    runtime: Arc<dyn ContainerRuntime>,
}

impl MinioHarness {
    /// Harness backed by the local Docker daemon
    pub fn docker(config: MinioConfig) -> Result<Self, HarnessError> {
        Ok(Self::with_runtime(config, Arc::new(DockerRuntime::connect()?)))
    }

    pub fn with_runtime(config: MinioConfig, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { config, runtime }
    }

    pub fn config(&self) -> &MinioConfig {
        &self.config
    }

    /// Provision a server, hand a client to `body`, then tear the server down.
    ///
    /// Teardown runs exactly once whether `body` returns or panics. A panic in
    /// `body` is resumed after teardown; a teardown failure after a successful
    /// body is returned as [`HarnessError::Teardown`].
    pub async fn run<F, Fut, T>(&self, body: F) -> Result<T, HarnessError>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut container = self.provision().await?;

        let client = match self.connect(&container).await {
            Ok(client) => client,
            Err(e) => {
                if let Err(teardown) = container.terminate().await {
                    warn!(error = %teardown, "Teardown failed after setup error");
                }
                return Err(e);
            }
        };

        let outcome = AssertUnwindSafe(async move { body(client).await })
            .catch_unwind()
            .await;
        let teardown = container.terminate().await;

        match outcome {
            Ok(value) => {
                teardown?;
                Ok(value)
            }
            Err(panic) => {
                if let Err(e) = teardown {
                    error!(error = %e, "Teardown failed after test body panicked");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Like [`run`](Self::run), but any harness error fails the calling test.
    pub async fn run_or_panic<F, Fut, T>(&self, body: F) -> T
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = T>,
    {
        match self.run(body).await {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }

    async fn provision(&self) -> Result<MinioContainer, HarnessError> {
        let name = format!("s3probe-minio-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);

        info!(
            container = %name,
            image = %self.config.image_ref(),
            "Provisioning MinIO container"
        );

        let id = self.runtime.start(&self.config, &name).await?;
        Ok(MinioContainer::new(self.runtime.clone(), id, name))
    }

    async fn connect(&self, container: &MinioContainer) -> Result<Client, HarnessError> {
        let endpoint = container.endpoint(self.config.port).await?;
        let base_url = endpoint.url();

        wait_ready(
            &base_url,
            &self.config.health_path,
            self.config.startup_timeout(),
        )
        .await?;

        info!(container = %container.name(), endpoint = %endpoint, "MinIO endpoint ready");

        build_client(&base_url, &self.config).await
    }
}

/// Run `body` against a disposable MinIO container started from `config`.
///
/// Any provisioning, readiness, client, or teardown error panics with a
/// message naming the cause, failing only the calling test.
pub async fn run_with_minio<F, Fut, T>(config: &MinioConfig, body: F) -> T
where
    F: FnOnce(Client) -> Fut,
    Fut: Future<Output = T>,
{
    let harness = match MinioHarness::docker(config.clone()) {
        Ok(harness) => harness,
        Err(e) => panic!("{}", e),
    };
    harness.run_or_panic(body).await
}
