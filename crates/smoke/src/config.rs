//! Harness configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a smoke run
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Base URL of the running PhotoWallet server
    pub base_url: String,

    /// Directory for screenshot artifacts
    pub artifact_dir: PathBuf,

    /// Run the browser with a visible window instead of headless
    pub headed: bool,

    /// How long to wait for the server to answer before giving up
    pub probe_timeout: Duration,

    /// How long a navigation may take to settle
    pub navigation_timeout: Duration,

    /// How long to wait for an element condition
    pub wait_timeout: Duration,

    /// Interval between condition polls
    pub poll_interval: Duration,

    /// How long to keep the final page on screen in headed mode
    pub hold_open: Duration,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            artifact_dir: std::env::temp_dir(),
            headed: false,
            probe_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            hold_open: Duration::from_secs(3),
        }
    }
}

/// Viewport dimensions exercised by the responsive checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportPreset {
    Mobile,
    Desktop,
}

impl ViewportPreset {
    pub fn width(&self) -> u32 {
        match self {
            ViewportPreset::Mobile => 375,
            ViewportPreset::Desktop => 1920,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            ViewportPreset::Mobile => 667,
            ViewportPreset::Desktop => 1080,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, ViewportPreset::Mobile)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewportPreset::Mobile => "mobile",
            ViewportPreset::Desktop => "desktop",
        }
    }
}
