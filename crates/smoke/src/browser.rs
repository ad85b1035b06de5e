//! Live browser session over the Chrome DevTools Protocol
//!
//! One session means one Chromium process and one page, reused by every
//! check in the run. Observations go through small JavaScript expressions
//! evaluated in the page, so the harness sees exactly what the app
//! rendered. Nullable results are stringified inside the page because the
//! protocol drops a bare `null` on the way out.

use std::fmt;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{SmokeConfig, ViewportPreset};
use crate::error::{SmokeError, SmokeResult};

const READY_STATE_JS: &str = r#"document.readyState === "complete""#;

/// Element geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.1} y={:.1} w={:.1} h={:.1}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Which way a selector wait should resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    fn label(&self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        }
    }
}

/// A running Chromium instance with a single page
///
/// `close` consumes the session, so a run cannot keep driving a browser
/// it already tore down. Dropping an unclosed session aborts the protocol
/// handler task; the Chromium child itself is reaped by the `Browser`
/// handle's drop.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
    wait_timeout: Duration,
    poll_interval: Duration,
    closed: bool,
}

impl BrowserSession {
    /// Launch Chromium and open a blank page at the desktop viewport
    pub async fn launch(config: &SmokeConfig) -> SmokeResult<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(
                ViewportPreset::Desktop.width(),
                ViewportPreset::Desktop.height(),
            )
            .request_timeout(config.navigation_timeout);
        if config.headed {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(SmokeError::Launch)?;

        debug!("Launching Chromium (headed: {})", config.headed);
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SmokeError::Launch(e.to_string()))?;

        // Pump protocol messages until the connection goes away
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        let session = Self {
            browser,
            page,
            handler_task: Some(handler_task),
            navigation_timeout: config.navigation_timeout,
            wait_timeout: config.wait_timeout,
            poll_interval: config.poll_interval,
            closed: false,
        };
        session.set_viewport(ViewportPreset::Desktop).await?;
        Ok(session)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate and wait until the document settles at `readyState ===
    /// "complete"`
    pub async fn navigate(&self, url: &str) -> SmokeResult<()> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        self.wait_until("page load to settle", self.navigation_timeout, READY_STATE_JS)
            .await
    }

    pub async fn title(&self) -> SmokeResult<String> {
        self.eval("document.title").await
    }

    /// Number of elements currently matching the selector
    pub async fn count(&self, selector: &str) -> SmokeResult<usize> {
        let n: u64 = self.eval(&count_js(selector)?).await?;
        Ok(n as usize)
    }

    /// Whether the first match is attached, styled visible, and has a
    /// non-empty box
    pub async fn is_visible(&self, selector: &str) -> SmokeResult<bool> {
        self.eval(&visible_js(selector)?).await
    }

    /// Trimmed text content of the first match
    pub async fn text(&self, selector: &str) -> SmokeResult<Option<String>> {
        self.eval_json(&text_js(selector)?).await
    }

    /// Geometry of the first match, `None` when nothing matches
    pub async fn bounding_box(&self, selector: &str) -> SmokeResult<Option<BoundingBox>> {
        self.eval_json(&bounding_box_js(selector)?).await
    }

    /// Click the first element matching the selector
    pub async fn click(&self, selector: &str) -> SmokeResult<()> {
        debug!("Clicking {}", selector);
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    /// Send a key press to the document body
    pub async fn press_key(&self, key: &str) -> SmokeResult<()> {
        debug!("Pressing {}", key);
        let body = self.page.find_element("body").await?;
        body.press_key(key).await?;
        Ok(())
    }

    /// Override the viewport and wait for the page to report the new
    /// dimensions
    pub async fn set_viewport(&self, preset: ViewportPreset) -> SmokeResult<()> {
        debug!(
            "Setting viewport to {} ({}x{})",
            preset.label(),
            preset.width(),
            preset.height()
        );
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(preset.width() as i64)
            .height(preset.height() as i64)
            .device_scale_factor(1.0)
            .mobile(preset.is_mobile())
            .build()
            .map_err(SmokeError::Protocol)?;
        self.page.execute(params).await?;

        let what = format!("{} viewport to apply", preset.label());
        self.wait_until(
            &what,
            self.wait_timeout,
            &viewport_matches_js(preset.width(), preset.height()),
        )
        .await
    }

    /// Capture the full page as PNG bytes
    pub async fn screenshot(&self) -> SmokeResult<Vec<u8>> {
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await?;
        Ok(bytes)
    }

    /// Wait for a selector to reach the requested visibility, failing the
    /// run on timeout
    pub async fn wait_for(&self, selector: &str, visibility: Visibility) -> SmokeResult<()> {
        let condition = visibility_condition_js(selector, visibility)?;
        let what = format!("{} to become {}", selector, visibility.label());
        self.wait_until(&what, self.wait_timeout, &condition).await
    }

    /// Like [`wait_for`](Self::wait_for) but a timeout is an answer, not
    /// an error
    pub async fn try_wait_for(&self, selector: &str, visibility: Visibility) -> SmokeResult<bool> {
        let condition = visibility_condition_js(selector, visibility)?;
        self.try_wait_until(self.wait_timeout, &condition).await
    }

    async fn wait_until(
        &self,
        what: &str,
        timeout: Duration,
        condition_js: &str,
    ) -> SmokeResult<()> {
        if self.try_wait_until(timeout, condition_js).await? {
            Ok(())
        } else {
            Err(SmokeError::Timeout(what.to_string()))
        }
    }

    async fn try_wait_until(&self, timeout: Duration, condition_js: &str) -> SmokeResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>(condition_js).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Evaluate an expression and deserialize its primitive result
    pub(crate) async fn eval<T: DeserializeOwned>(&self, expression: &str) -> SmokeResult<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .build()
            .map_err(SmokeError::Protocol)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.into_value()?)
    }

    /// Evaluate an expression that returns a stringified JSON payload
    pub(crate) async fn eval_json<T: DeserializeOwned>(&self, expression: &str) -> SmokeResult<T> {
        let payload: String = self.eval(expression).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Tear the session down. Closing twice is impossible since this
    /// consumes the session.
    pub async fn close(mut self) {
        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        debug!("Closing browser session");
        if let Err(e) = self.browser.close().await {
            warn!("Browser close reported: {}", e);
        }
        if let Some(task) = self.handler_task.take() {
            let abort = task.abort_handle();
            if tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .is_err()
            {
                abort.abort();
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser session dropped without an explicit close");
            if let Some(task) = self.handler_task.take() {
                task.abort();
            }
        }
    }
}

/// Embed a string into JavaScript source as a quoted literal
fn js_string(value: &str) -> SmokeResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn count_js(selector: &str) -> SmokeResult<String> {
    Ok(format!(
        "document.querySelectorAll({}).length",
        js_string(selector)?
    ))
}

fn visible_js(selector: &str) -> SmokeResult<String> {
    Ok(format!(
        r#"(function() {{
    const el = document.querySelector({});
    if (!el) {{ return false; }}
    const style = window.getComputedStyle(el);
    if (style.display === "none" || style.visibility === "hidden") {{ return false; }}
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}})()"#,
        js_string(selector)?
    ))
}

fn visibility_condition_js(selector: &str, visibility: Visibility) -> SmokeResult<String> {
    let visible = visible_js(selector)?;
    Ok(match visibility {
        Visibility::Visible => visible,
        Visibility::Hidden => format!("!({})", visible),
    })
}

fn text_js(selector: &str) -> SmokeResult<String> {
    Ok(format!(
        r#"(function() {{
    const el = document.querySelector({});
    return JSON.stringify(el ? (el.textContent || "").trim() : null);
}})()"#,
        js_string(selector)?
    ))
}

fn bounding_box_js(selector: &str) -> SmokeResult<String> {
    Ok(format!(
        r#"(function() {{
    const el = document.querySelector({});
    if (!el) {{ return JSON.stringify(null); }}
    const rect = el.getBoundingClientRect();
    return JSON.stringify({{ x: rect.x, y: rect.y, width: rect.width, height: rect.height }});
}})()"#,
        js_string(selector)?
    ))
}

fn viewport_matches_js(width: u32, height: u32) -> String {
    format!("window.innerWidth === {width} && window.innerHeight === {height}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors;

    #[test]
    fn js_string_quotes_and_escapes() {
        let quoted = js_string(selectors::PHOTO_GRID).unwrap();
        assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        assert!(quoted.contains(r#"\"grid-photos\""#));
    }

    #[test]
    fn count_js_embeds_selector_literal() {
        let js = count_js(selectors::PHOTO_CARD).unwrap();
        assert!(js.starts_with("document.querySelectorAll(\""));
        assert!(js.ends_with(".length"));
        assert!(js.contains(r#"\"card-photo\""#));
    }

    #[test]
    fn visible_js_checks_style_and_geometry() {
        let js = visible_js(selectors::DIALOG).unwrap();
        assert!(js.contains("getComputedStyle"));
        assert!(js.contains("getBoundingClientRect"));
        assert!(js.contains(r#"\"dialog\""#));
    }

    #[test]
    fn hidden_condition_negates_visible() {
        let visible = visibility_condition_js("h1", Visibility::Visible).unwrap();
        let hidden = visibility_condition_js("h1", Visibility::Hidden).unwrap();
        assert!(hidden.starts_with("!("));
        assert!(hidden.contains(&visible));
    }

    #[test]
    fn nullable_payloads_are_stringified() {
        let text = text_js("h1").unwrap();
        let bbox = bounding_box_js(selectors::VIEWER_IMAGE).unwrap();
        assert!(text.contains("JSON.stringify"));
        assert!(bbox.contains("JSON.stringify(null)"));
    }

    #[test]
    fn viewport_condition_uses_inner_dimensions() {
        let js = viewport_matches_js(375, 667);
        assert_eq!(js, "window.innerWidth === 375 && window.innerHeight === 667");
    }

    #[test]
    fn bounding_box_display_is_compact() {
        let bbox = BoundingBox {
            x: 10.24,
            y: 20.0,
            width: 300.5,
            height: 150.0,
        };
        assert_eq!(bbox.to_string(), "x=10.2 y=20.0 w=300.5 h=150.0");
    }

    #[test]
    fn bounding_box_deserializes_from_page_payload() {
        let bbox: BoundingBox =
            serde_json::from_str(r#"{"x":1.5,"y":2.0,"width":640.0,"height":480.0}"#).unwrap();
        assert_eq!(bbox.width, 640.0);
        assert_eq!(bbox.height, 480.0);
    }
}
