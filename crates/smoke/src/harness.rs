//! The fixed smoke-check sequence
//!
//! Checks run in a set order against one browser session, stopping at the
//! first failure. A failed run still captures a diagnostic screenshot and
//! still tears the session down before the error propagates.

use std::path::PathBuf;
use std::time::Instant;

use tracing::warn;

use crate::artifact::{names, ArtifactStore};
use crate::browser::{BrowserSession, Visibility};
use crate::config::{SmokeConfig, ViewportPreset};
use crate::error::{SmokeError, SmokeResult};
use crate::events::{PageEventLog, PageSeverity};
use crate::metrics;
use crate::probe;
use crate::report::{RunReport, StepRecord, StepStatus};
use crate::selectors;

pub struct Harness {
    config: SmokeConfig,
    artifacts: ArtifactStore,
    report: RunReport,
}

impl Harness {
    pub fn new(config: SmokeConfig) -> SmokeResult<Self> {
        let artifacts = ArtifactStore::new(&config.artifact_dir)?;
        Ok(Self {
            config,
            artifacts,
            report: RunReport::new(),
        })
    }

    /// Run every check. The session opened here is closed on all paths
    /// before this returns.
    pub async fn run(mut self) -> SmokeResult<RunReport> {
        let started = Instant::now();
        println!(
            "🧪 PhotoWallet smoke checks (target: {})",
            self.config.base_url
        );

        self.step_probe().await?;

        let session = BrowserSession::launch(&self.config).await?;
        let outcome = self.drive(&session).await;

        if let Err(err) = &outcome {
            println!("\n❌ Run failed: {}", err);
            self.capture_failure(&session).await;
        }

        if self.config.headed && !self.config.hold_open.is_zero() {
            tokio::time::sleep(self.config.hold_open).await;
        }

        session.close().await;
        outcome?;

        self.report
            .print_summary(started.elapsed(), self.artifacts.dir());
        Ok(self.report)
    }

    /// Everything between launch and teardown. An error returned here,
    /// including a failed event subscription, still reaches the close in
    /// [`run`](Self::run); the event listeners are detached when this
    /// returns.
    async fn drive(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let events = PageEventLog::attach(session.page()).await?;
        self.execute(session, &events).await
    }

    async fn execute(
        &mut self,
        session: &BrowserSession,
        events: &PageEventLog,
    ) -> SmokeResult<()> {
        self.step_load(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_welcome(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_initial_state(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_buttons(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_grid(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_viewer(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_settings(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_responsive(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_console_review(events);
        self.ensure_page_healthy(events)?;
        self.step_metrics(session).await?;
        self.ensure_page_healthy(events)?;
        self.step_manifest().await?;
        self.ensure_page_healthy(events)?;
        Ok(())
    }

    async fn step_probe(&mut self) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 1: Waiting for server at {}", self.config.base_url);

        let attempts = probe::wait_for_server(
            &self.config.base_url,
            self.config.probe_timeout,
            self.config.poll_interval,
        )
        .await?;
        println!("   Server answered after {} attempt(s)", attempts);

        self.record(
            "server readiness",
            StepStatus::Passed,
            Some(format!("{} attempt(s)", attempts)),
            None,
            started,
        );
        Ok(())
    }

    async fn step_load(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 2: Loading app at {}", self.config.base_url);

        session.navigate(&self.config.base_url).await?;
        let shot = self.capture(session, names::LOADED).await?;

        self.record("load app", StepStatus::Passed, None, Some(shot), started);
        Ok(())
    }

    async fn step_welcome(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 3: Welcome screen");

        if session.is_visible(selectors::GET_STARTED_BUTTON).await? {
            session.click(selectors::GET_STARTED_BUTTON).await?;
            session
                .wait_for(selectors::GET_STARTED_BUTTON, Visibility::Hidden)
                .await?;
            println!("   Dismissed welcome screen");
            self.record(
                "welcome screen",
                StepStatus::Passed,
                Some("dismissed".to_string()),
                None,
                started,
            );
        } else {
            println!("   No welcome screen shown");
            self.record(
                "welcome screen",
                StepStatus::Skipped,
                Some("not shown".to_string()),
                None,
                started,
            );
        }
        Ok(())
    }

    async fn step_initial_state(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 4: Initial app state");

        let title = session.title().await?;
        println!("   Page title: {}", title);

        if session.count(selectors::HEADING).await? == 0 {
            return Err(SmokeError::StepFailed {
                step: "initial app state".to_string(),
                reason: "no top-level heading rendered".to_string(),
            });
        }
        let heading = session.text(selectors::HEADING).await?.unwrap_or_default();
        println!("   Found heading: {}", heading);

        self.record(
            "initial app state",
            StepStatus::Passed,
            Some(heading),
            None,
            started,
        );
        Ok(())
    }

    async fn step_buttons(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 5: Interactive elements");

        let buttons = session.count(selectors::BUTTON).await?;
        println!("   Found {} buttons", buttons);
        if buttons == 0 {
            return Err(SmokeError::StepFailed {
                step: "interactive elements".to_string(),
                reason: "no buttons rendered".to_string(),
            });
        }
        let shot = self.capture(session, names::UI).await?;

        self.record(
            "interactive elements",
            StepStatus::Passed,
            Some(format!("{} buttons", buttons)),
            Some(shot),
            started,
        );
        Ok(())
    }

    async fn step_grid(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 6: Photo grid");

        if session.count(selectors::PHOTO_GRID).await? > 0 {
            println!("   Photo grid is present");
            self.record(
                "photo grid",
                StepStatus::Passed,
                Some("grid present".to_string()),
                None,
                started,
            );
        } else if session.is_visible(selectors::EMPTY_STATE).await? {
            println!("   Empty state shown (no photos yet)");
            self.record(
                "photo grid",
                StepStatus::Passed,
                Some("empty state".to_string()),
                None,
                started,
            );
        } else {
            return Err(SmokeError::StepFailed {
                step: "photo grid".to_string(),
                reason: "neither the grid nor the empty state is present".to_string(),
            });
        }
        Ok(())
    }

    async fn step_viewer(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 7: Photo viewer");

        let photos = session.count(selectors::PHOTO_CARD).await?;
        println!("   📸 Found {} photos", photos);
        if photos == 0 {
            println!("   ⚠️  No photos found - skipping viewer checks");
            self.record(
                "photo viewer",
                StepStatus::Skipped,
                Some("no photos".to_string()),
                None,
                started,
            );
            return Ok(());
        }

        session.click(selectors::PHOTO_CARD).await?;
        session
            .wait_for(selectors::VIEWER_IMAGE, Visibility::Visible)
            .await?;
        let shot = self.capture(session, names::VIEWER).await?;

        if let Some(bbox) = session.bounding_box(selectors::VIEWER_IMAGE).await? {
            println!("   🖼  Photo: {}", bbox);
        }
        match session.bounding_box(selectors::PREVIOUS_ARROW).await? {
            Some(bbox) => println!("   ⬅️  Previous arrow: {}", bbox),
            None => println!("   ⬅️  Previous arrow not rendered"),
        }
        match session.bounding_box(selectors::NEXT_ARROW).await? {
            Some(bbox) => println!("   ➡️  Next arrow: {}", bbox),
            None => println!("   ➡️  Next arrow not rendered"),
        }

        if session.is_visible(selectors::BACK_BUTTON).await? {
            session.click(selectors::BACK_BUTTON).await?;
        } else {
            session.press_key("Escape").await?;
        }
        session
            .wait_for(selectors::VIEWER_IMAGE, Visibility::Hidden)
            .await?;
        println!("   Returned to the grid");

        self.record(
            "photo viewer",
            StepStatus::Passed,
            Some(format!("{} photos", photos)),
            Some(shot),
            started,
        );
        Ok(())
    }

    async fn step_settings(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 8: Settings dialog");

        if !session.is_visible(selectors::SETTINGS_BUTTON).await? {
            println!("   Settings control not found - skipping");
            self.record(
                "settings dialog",
                StepStatus::Skipped,
                Some("control not found".to_string()),
                None,
                started,
            );
            return Ok(());
        }

        session.click(selectors::SETTINGS_BUTTON).await?;
        let opened = session
            .try_wait_for(selectors::DIALOG, Visibility::Visible)
            .await?;
        if opened {
            println!("   Settings dialog opened");
        } else {
            println!("   No dialog appeared after click");
        }
        let shot = self.capture(session, names::SETTINGS).await?;

        session.press_key("Escape").await?;
        session.wait_for(selectors::DIALOG, Visibility::Hidden).await?;
        if opened {
            println!("   Dialog closed with Escape");
        }

        self.record(
            "settings dialog",
            StepStatus::Passed,
            Some(if opened { "opened and closed" } else { "no dialog" }.to_string()),
            Some(shot),
            started,
        );
        Ok(())
    }

    async fn step_responsive(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 9: Responsive layout");

        for (preset, name) in [
            (ViewportPreset::Mobile, names::MOBILE),
            (ViewportPreset::Desktop, names::DESKTOP),
        ] {
            session.set_viewport(preset).await?;
            println!(
                "   {} viewport applied ({}x{})",
                preset.label(),
                preset.width(),
                preset.height()
            );
            self.capture(session, name).await?;
        }

        self.record(
            "responsive layout",
            StepStatus::Passed,
            Some("mobile and desktop captured".to_string()),
            None,
            started,
        );
        Ok(())
    }

    fn step_console_review(&mut self, events: &PageEventLog) {
        let started = Instant::now();
        println!("\n✅ Check 10: Console activity");

        let totals = events.totals();
        println!(
            "   Captured {} console message(s) ({} warnings)",
            totals.messages, totals.warnings
        );
        for event in events
            .snapshot()
            .iter()
            .filter(|e| e.severity >= PageSeverity::Warning)
        {
            println!("   ⚠️  {}", event.message);
        }
        if totals.errors == 0 {
            println!("   No page errors detected");
        }

        self.record(
            "console activity",
            StepStatus::Passed,
            Some(format!("{} messages", totals.messages)),
            None,
            started,
        );
    }

    async fn step_metrics(&mut self, session: &BrowserSession) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 11: Performance metrics");

        let timing = metrics::collect(session)
            .await?
            .ok_or_else(|| SmokeError::StepFailed {
                step: "performance metrics".to_string(),
                reason: "no navigation entry recorded".to_string(),
            })?;
        if !timing.is_sane() {
            return Err(SmokeError::StepFailed {
                step: "performance metrics".to_string(),
                reason: format!("implausible timing values: {:?}", timing),
            });
        }

        println!("   DOM Content Loaded: {:.2}ms", timing.dom_content_loaded_ms);
        println!("   Load Complete: {:.2}ms", timing.load_complete_ms);
        println!("   DOM Interactive: {:.2}ms", timing.dom_interactive_ms);

        self.record(
            "performance metrics",
            StepStatus::Passed,
            Some(format!("dom interactive {:.2}ms", timing.dom_interactive_ms)),
            None,
            started,
        );
        Ok(())
    }

    async fn step_manifest(&mut self) -> SmokeResult<()> {
        let started = Instant::now();
        println!("\n✅ Check 12: PWA manifest");

        probe::check_manifest(&self.config.base_url).await?;
        println!("   manifest.json served successfully");

        self.record("pwa manifest", StepStatus::Passed, None, None, started);
        Ok(())
    }

    /// Fail the run as soon as the page has reported an error
    fn ensure_page_healthy(&self, events: &PageEventLog) -> SmokeResult<()> {
        match events.first_fatal() {
            Some(event) => Err(SmokeError::Page(event.message)),
            None => Ok(()),
        }
    }

    async fn capture(&self, session: &BrowserSession, name: &str) -> SmokeResult<PathBuf> {
        let bytes = session.screenshot().await?;
        let path = self.artifacts.write(name, &bytes)?;
        println!("   Screenshot saved: {}", path.display());
        Ok(path)
    }

    /// Best effort: a failed run should still leave a picture of what the
    /// page looked like
    async fn capture_failure(&self, session: &BrowserSession) {
        match session.screenshot().await {
            Ok(bytes) => match self.artifacts.write(names::ERROR, &bytes) {
                Ok(path) => println!("   Error screenshot saved: {}", path.display()),
                Err(e) => warn!("Could not write error screenshot: {}", e),
            },
            Err(e) => warn!("Could not capture error screenshot: {}", e),
        }
    }

    fn record(
        &mut self,
        label: &str,
        status: StepStatus,
        detail: Option<String>,
        artifact: Option<PathBuf>,
        started: Instant,
    ) {
        self.report.push(StepRecord {
            label: label.to_string(),
            status,
            detail,
            artifact,
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PageEvent, PageSeverity};

    fn harness_in(dir: &std::path::Path) -> Harness {
        let config = SmokeConfig {
            artifact_dir: dir.to_path_buf(),
            ..SmokeConfig::default()
        };
        Harness::new(config).unwrap()
    }

    #[test]
    fn new_creates_artifact_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("shots");
        harness_in(&dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn healthy_page_passes_the_gate() {
        let tmp = tempfile::tempdir().unwrap();
        let harness = harness_in(tmp.path());

        let events = PageEventLog::seeded(vec![
            PageEvent {
                severity: PageSeverity::Info,
                message: "app booted".to_string(),
            },
            PageEvent {
                severity: PageSeverity::Warning,
                message: "deprecated API".to_string(),
            },
        ]);
        assert!(harness.ensure_page_healthy(&events).is_ok());
    }

    #[test]
    fn fatal_event_fails_the_gate() {
        let tmp = tempfile::tempdir().unwrap();
        let harness = harness_in(tmp.path());

        let events = PageEventLog::seeded(vec![PageEvent {
            severity: PageSeverity::Error,
            message: "TypeError: photos.map is not a function".to_string(),
        }]);

        let err = harness.ensure_page_healthy(&events).unwrap_err();
        match err {
            SmokeError::Page(message) => assert!(message.contains("TypeError")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn console_review_records_message_totals() {
        let tmp = tempfile::tempdir().unwrap();
        let mut harness = harness_in(tmp.path());

        let events = PageEventLog::seeded(vec![
            PageEvent {
                severity: PageSeverity::Info,
                message: "app booted".to_string(),
            },
            PageEvent {
                severity: PageSeverity::Warning,
                message: "deprecated API".to_string(),
            },
        ]);
        harness.step_console_review(&events);

        let steps = harness.report.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "console activity");
        assert_eq!(steps[0].status, StepStatus::Passed);
        assert_eq!(steps[0].detail.as_deref(), Some("2 messages"));
    }

    #[test]
    fn record_tracks_status_and_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let mut harness = harness_in(tmp.path());

        let started = Instant::now();
        harness.record(
            "photo viewer",
            StepStatus::Skipped,
            Some("no photos".to_string()),
            None,
            started,
        );

        let steps = harness.report.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "photo viewer");
        assert_eq!(steps[0].status, StepStatus::Skipped);
        assert_eq!(steps[0].detail.as_deref(), Some("no photos"));
    }
}
