//! MinIO provisioning configuration

use serde::Deserialize;
use std::time::Duration;

/// Everything needed to start and talk to a disposable MinIO server
#[derive(Debug, Clone, Deserialize)]
pub struct MinioConfig {
    /// Image repository, without tag
    #[serde(default = "default_image")]
    pub image: String,

    #[serde(default = "default_tag")]
    pub tag: String,

    /// Root user, also used as the S3 access key
    #[serde(default = "default_root_user")]
    pub root_user: String,

    /// Root password, also used as the S3 secret key
    #[serde(default = "default_root_password")]
    pub root_password: String,

    /// Container port the S3 API listens on
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Path polled until the server reports healthy
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// How long to wait for the readiness probe, in milliseconds
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,

    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            tag: default_tag(),
            root_user: default_root_user(),
            root_password: default_root_password(),
            port: default_port(),
            command: default_command(),
            health_path: default_health_path(),
            startup_timeout_ms: default_startup_timeout_ms(),
            region: default_region(),
        }
    }
}

fn default_image() -> String {
    "quay.io/minio/minio".to_string()
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_root_user() -> String {
    "minio".to_string()
}

fn default_root_password() -> String {
    "minio123".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_command() -> Vec<String> {
    vec!["server".to_string(), "/data".to_string()]
}

fn default_health_path() -> String {
    "/minio/health/live".to_string()
}

fn default_startup_timeout_ms() -> u64 {
    60_000
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl MinioConfig {
    /// Load configuration from `s3probe.toml` (optional) and `S3PROBE_*` environment variables
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config = ::config::Config::builder()
            .add_source(::config::File::with_name("s3probe").required(false))
            .add_source(::config::Environment::with_prefix("S3PROBE"))
            .build()?;

        config.try_deserialize::<MinioConfig>()
    }

    /// Full image reference, e.g. `quay.io/minio/minio:latest`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Docker port key for the S3 API, e.g. `9000/tcp`
    pub fn exposed_port(&self) -> String {
        format!("{}/tcp", self.port)
    }

    /// Container environment carrying the root credentials
    pub fn env(&self) -> Vec<String> {
        vec![
            format!("MINIO_ROOT_USER={}", self.root_user),
            format!("MINIO_ROOT_PASSWORD={}", self.root_password),
        ]
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MinioConfig::default();
        assert_eq!(config.image_ref(), "quay.io/minio/minio:latest");
        assert_eq!(config.exposed_port(), "9000/tcp");
        assert_eq!(config.command, vec!["server", "/data"]);
        assert_eq!(config.health_path, "/minio/health/live");
        assert_eq!(config.startup_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_env_carries_credentials() {
        let config = MinioConfig::default();
        assert_eq!(
            config.env(),
            vec!["MINIO_ROOT_USER=minio", "MINIO_ROOT_PASSWORD=minio123"]
        );
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: MinioConfig = ::config::Config::builder()
            .set_override("tag", "RELEASE.2024-01-01T00-00-00Z")
            .unwrap()
            .set_override("startup_timeout_ms", 5_000)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.image_ref(),
            "quay.io/minio/minio:RELEASE.2024-01-01T00-00-00Z"
        );
        assert_eq!(config.startup_timeout(), Duration::from_secs(5));
        assert_eq!(config.root_user, "minio");
    }

    #[test]
    fn test_sub_second_timeout_keeps_precision() {
        let config = MinioConfig::default().with_startup_timeout(Duration::from_millis(500));
        assert_eq!(config.startup_timeout(), Duration::from_millis(500));

        let config = MinioConfig::default().with_startup_timeout(Duration::from_millis(1_500));
        assert_eq!(config.startup_timeout(), Duration::from_millis(1_500));
    }
}
