//! Navigation timing metrics
//!
//! Read from the browser's `PerformanceNavigationTiming` entry after the
//! page has loaded. All values are milliseconds; the interactive span is
//! measured from fetch start so redirect and unload time stay out of it.

use serde::{Deserialize, Serialize};

use crate::browser::BrowserSession;
use crate::error::SmokeResult;

/// Pulls the navigation entry out of the page. Returns a stringified
/// object so the nothing-recorded case survives the protocol boundary as
/// an explicit `"null"`.
const NAV_TIMING_JS: &str = r#"(function() {
    const nav = performance.getEntriesByType("navigation")[0];
    if (!nav) {
        return JSON.stringify(null);
    }
    return JSON.stringify({
        dom_content_loaded_ms: nav.domContentLoadedEventEnd - nav.domContentLoadedEventStart,
        load_complete_ms: nav.loadEventEnd - nav.loadEventStart,
        dom_interactive_ms: nav.domInteractive - nav.fetchStart
    });
})()"#;

/// Load milestones for the initial navigation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavTiming {
    /// Duration of the DOMContentLoaded event handlers
    pub dom_content_loaded_ms: f64,

    /// Duration of the load event handlers
    pub load_complete_ms: f64,

    /// Time from fetch start until the DOM became interactive
    pub dom_interactive_ms: f64,
}

impl NavTiming {
    /// A timing is usable when every milestone is a finite, non-negative
    /// number of milliseconds
    pub fn is_sane(&self) -> bool {
        [
            self.dom_content_loaded_ms,
            self.load_complete_ms,
            self.dom_interactive_ms,
        ]
        .iter()
        .all(|ms| ms.is_finite() && *ms >= 0.0)
    }
}

/// Collect timing from the live page. `None` means the browser recorded
/// no navigation entry.
pub async fn collect(session: &BrowserSession) -> SmokeResult<Option<NavTiming>> {
    session.eval_json(NAV_TIMING_JS).await
}
