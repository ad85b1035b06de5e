//! Error types for the smoke harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Invalid protocol parameters: {0}")]
    Protocol(String),

    #[error("Server not reachable at {url} after {attempts} attempts")]
    ServerUnreachable { url: String, attempts: usize },

    #[error("Manifest check failed with HTTP status {0}")]
    ManifestStatus(u16),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Page reported a fatal event: {0}")]
    Page(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type SmokeResult<T> = Result<T, SmokeError>;
