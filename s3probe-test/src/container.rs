//! Container lifecycle
//!
//! The harness drives containers through [`ContainerRuntime`] so the lifecycle
//! can be exercised without a Docker daemon. [`DockerRuntime`] is the real
//! implementation, talking to the local daemon through bollard.

use crate::config::MinioConfig;
use crate::error::HarnessError;
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures::TryStreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backend able to run a MinIO container
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create and start a container named `name`, returning its id
    async fn start(&self, config: &MinioConfig, name: &str) -> Result<String, HarnessError>;

    /// Host the container's published ports are reachable on
    async fn host(&self, id: &str) -> Result<String, HarnessError>;

    /// Host port bound to `port/tcp` inside the container
    async fn mapped_port(&self, id: &str, port: u16) -> Result<u16, HarnessError>;

    /// Stop and remove the container
    async fn terminate(&self, id: &str) -> Result<(), HarnessError>;
}

/// Externally reachable address of a running server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Plain-HTTP base URL
    pub fn url(&self) -> String {
        format!("http://{}", self)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A provisioned container, owned by the harness until it is terminated
pub struct MinioContainer {
    runtime: Arc<dyn ContainerRuntime>,
    id: String,
    name: String,
    terminated: bool,
}

impl MinioContainer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, id: String, name: String) -> Self {
        Self {
            runtime,
            id,
            name,
            terminated: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the host and mapped port of `port/tcp`
    pub async fn endpoint(&self, port: u16) -> Result<Endpoint, HarnessError> {
        let host = self.runtime.host(&self.id).await?;
        let port = self.runtime.mapped_port(&self.id, port).await?;
        Ok(Endpoint { host, port })
    }

    /// Remove the container. Only the first call reaches the runtime.
    pub async fn terminate(&mut self) -> Result<(), HarnessError> {
        if self.terminated {
            return Ok(());
        }
        self.terminated = true;

        info!(container = %self.name, "Terminating MinIO container");
        self.runtime.terminate(&self.id).await
    }
}

/// Best-effort cleanup when a container is dropped without [`MinioContainer::terminate`].
///
/// Removal is spawned onto the current tokio runtime. On a multi-threaded
/// runtime that keeps running, the task completes. A current-thread runtime
/// (the `#[tokio::test]` default) that is shutting down drops the task before
/// it runs, so the container is left behind. Call `terminate` instead of
/// relying on this.
impl Drop for MinioContainer {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }

        // The owning future was dropped before teardown ran
        warn!(container = %self.name, "MinIO container dropped without teardown, removing in background");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let runtime = self.runtime.clone();
            let id = std::mem::take(&mut self.id);
            handle.spawn(async move {
                if let Err(e) = runtime.terminate(&id).await {
                    warn!(error = %e, "Background container removal failed");
                }
            });
        }
    }
}

/// [`ContainerRuntime`] backed by the local Docker daemon
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
    host: String,
}

impl DockerRuntime {
    /// Connect using the local defaults (`DOCKER_HOST` or the platform socket)
    pub fn connect() -> Result<Self, HarnessError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| HarnessError::Provision(format!("Docker not available: {}", e)))?;

        Ok(Self {
            docker,
            host: docker_host(std::env::var("DOCKER_HOST").ok().as_deref()),
        })
    }

    /// Pull the image unless it is already present
    async fn ensure_image(&self, config: &MinioConfig) -> Result<(), HarnessError> {
        let image = config.image_ref();
        if self.docker.inspect_image(&image).await.is_ok() {
            return Ok(());
        }

        info!(image = %image, "Pulling MinIO image");

        let options = CreateImageOptions {
            from_image: config.image.as_str(),
            tag: config.tag.as_str(),
            ..Default::default()
        };
        self.docker
            .create_image(Some(options), None, None)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| HarnessError::Provision(format!("failed to pull {}: {}", image, e)))?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), bollard::errors::Error> {
        self.docker
            .remove_container(
                id,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn start(&self, config: &MinioConfig, name: &str) -> Result<String, HarnessError> {
        self.ensure_image(config).await?;

        let container_config = Config {
            image: Some(config.image_ref()),
            env: Some(config.env()),
            cmd: Some(config.command.clone()),
            exposed_ports: Some(HashMap::from([(config.exposed_port(), HashMap::new())])),
            host_config: Some(HostConfig {
                publish_all_ports: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        debug!(container = %name, config = ?container_config, "Creating container");

        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name,
                    platform: None,
                }),
                container_config,
            )
            .await
            .map_err(|e| HarnessError::Provision(e.to_string()))?;

        if let Err(e) = self
            .docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
        {
            // Don't leak the created-but-stopped container
            let _ = self.remove(&created.id).await;
            return Err(HarnessError::Provision(format!(
                "failed to start {}: {}",
                name, e
            )));
        }

        info!(
            container = %name,
            container_id = %created.id,
            image = %config.image_ref(),
            "Started MinIO container"
        );

        Ok(created.id)
    }

    async fn host(&self, _id: &str) -> Result<String, HarnessError> {
        if self.host.is_empty() {
            return Err(HarnessError::address("host", "empty Docker host"));
        }
        Ok(self.host.clone())
    }

    async fn mapped_port(&self, id: &str, port: u16) -> Result<u16, HarnessError> {
        let info = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| HarnessError::address("port", e.to_string()))?;

        let key = format!("{}/tcp", port);
        let host_port = info
            .network_settings
            .and_then(|settings| settings.ports)
            .and_then(|mut ports| ports.remove(&key))
            .flatten()
            .and_then(|bindings| bindings.into_iter().find_map(|b| b.host_port))
            .ok_or_else(|| HarnessError::address("port", format!("no host binding for {}", key)))?;

        host_port
            .parse::<u16>()
            .map_err(|e| HarnessError::address("port", format!("{:?}: {}", host_port, e)))
    }

    async fn terminate(&self, id: &str) -> Result<(), HarnessError> {
        self.remove(id).await.map_err(|e| HarnessError::Teardown {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Host that published container ports are reachable on.
///
/// A TCP `DOCKER_HOST` points at a remote daemon; everything else (unix
/// socket, named pipe, unset) publishes on the local machine.
fn docker_host(docker_host: Option<&str>) -> String {
    docker_host
        .and_then(|raw| url::Url::parse(raw).ok())
        .filter(|url| matches!(url.scheme(), "tcp" | "http" | "https"))
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_host_defaults_to_localhost() {
        assert_eq!(docker_host(None), "localhost");
        assert_eq!(docker_host(Some("unix:///var/run/docker.sock")), "localhost");
        assert_eq!(docker_host(Some("not a url")), "localhost");
    }

    #[test]
    fn test_docker_host_from_tcp() {
        assert_eq!(docker_host(Some("tcp://10.0.0.5:2375")), "10.0.0.5");
        assert_eq!(docker_host(Some("tcp://docker.internal:2376")), "docker.internal");
    }

    #[test]
    fn test_endpoint_url() {
        let endpoint = Endpoint {
            host: "localhost".to_string(),
            port: 32768,
        };
        assert_eq!(endpoint.to_string(), "localhost:32768");
        assert_eq!(endpoint.url(), "http://localhost:32768");
    }
}
