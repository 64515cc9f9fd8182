//! HTTP readiness probe

use crate::error::HarnessError;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Delay between probe attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-request timeout, so a hung connection can't eat the whole startup budget
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll `GET {base_url}{path}` until it returns a success status or `timeout` elapses.
pub async fn wait_ready(base_url: &str, path: &str, timeout: Duration) -> Result<(), HarnessError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| HarnessError::Readiness {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    let start = Instant::now();

    // At least one attempt, even with a zero timeout
    let last_failure = loop {
        let failure = match http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    url = %url,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "MinIO ready"
                );
                return Ok(());
            }
            Ok(response) => format!("status {}", response.status()),
            Err(e) => e.to_string(),
        };

        if start.elapsed() >= timeout {
            break failure;
        }

        debug!(url = %url, failure = %failure, "MinIO not ready yet");
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    Err(HarnessError::Readiness {
        url,
        reason: format!("timed out after {:?} ({})", timeout, last_failure),
    })
}
