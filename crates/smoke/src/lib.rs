//! PhotoWallet Smoke Harness
//!
//! Drives a real Chromium instance against a running PhotoWallet server
//! and verifies the app's core surfaces: load, photo grid, viewer,
//! settings, responsive layout, console health, and load timing. One
//! browser session serves the entire run and is always torn down, pass
//! or fail.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Harness (fixed order)                  │
//! ├────────────────────────────────────────────────────────────┤
//! │  probe::wait_for_server()      is anything listening?      │
//! │  BrowserSession::launch()      one Chromium, one page      │
//! │  PageEventLog::attach()        console + exception capture │
//! │  step 2..12                    observe / interact / capture│
//! │  BrowserSession::close()       teardown on every path      │
//! ├────────────────────────────────────────────────────────────┤
//! │  BrowserSession                                            │
//! │    ├── navigate / title / count / text / bounding_box      │
//! │    ├── click / press_key / set_viewport / screenshot       │
//! │    └── wait_for(selector, Visible | Hidden)                │
//! │  ArtifactStore                 fixed-name PNGs in temp dir │
//! │  RunReport                     per-check records + summary │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod browser;
pub mod config;
pub mod error;
pub mod events;
pub mod harness;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod selectors;

pub use browser::{BoundingBox, BrowserSession, Visibility};
pub use config::{SmokeConfig, ViewportPreset};
pub use error::{SmokeError, SmokeResult};
pub use harness::Harness;
pub use report::{RunReport, StepStatus};
