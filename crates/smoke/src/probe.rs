//! Server readiness probing
//!
//! The harness never starts PhotoWallet itself. It only checks that
//! something is answering HTTP at the configured address before opening
//! the browser. Any HTTP response counts as listening, status included,
//! since even a 500 page yields a useful diagnostic screenshot.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{SmokeError, SmokeResult};

/// Client timeout for a single probe request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll the server until it answers, returning how many attempts it took
pub async fn wait_for_server(
    base_url: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> SmokeResult<usize> {
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) => {
                debug!(
                    "Server answered with {} after {} attempt(s)",
                    resp.status(),
                    attempts
                );
                return Ok(attempts);
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for server at {}...", base_url);
                }
                // Connection refused is expected while the server is starting
                if !e.is_connect() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        sleep(poll_interval).await;
    }

    Err(SmokeError::ServerUnreachable {
        url: base_url.to_string(),
        attempts,
    })
}

/// Fetch the PWA manifest, requiring a success status
pub async fn check_manifest(base_url: &str) -> SmokeResult<()> {
    let url = manifest_url(base_url);
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let resp = client.get(&url).send().await?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(SmokeError::ManifestStatus(resp.status().as_u16()))
    }
}

fn manifest_url(base_url: &str) -> String {
    format!("{}/manifest.json", base_url.trim_end_matches('/'))
}
