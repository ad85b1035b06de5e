//! Live browser session test
//!
//! Drives a real headless Chromium through `BrowserSession` against a
//! page served from a throwaway local listener.

use std::process::Command;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use photowallet_smoke::{BrowserSession, SmokeConfig, ViewportPreset, Visibility};

const PAGE: &str = r#"<!doctype html>
<html>
<head><title>Stub Gallery</title></head>
<body>
  <h1>Hello</h1>
  <button>One</button>
  <button>Two</button>
  <div id="visible" style="width: 120px; height: 40px;">shown</div>
  <div id="hidden" style="display: none;">tucked away</div>
</body>
</html>"#;

fn in_path(bin: &str) -> bool {
    Command::new("sh")
        .arg("-lc")
        .arg(format!("command -v {bin} >/dev/null 2>&1"))
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn browser_available() -> bool {
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .iter()
        .any(|bin| in_path(bin))
}

/// Serve the stub page from an ephemeral port and return its base URL.
async fn serve_page() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{PAGE}",
                    PAGE.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
    format!("http://{}", addr)
}

/// Exercises launch, navigation, element queries, viewport switching and
/// screenshots against a real browser.
///
/// Marked ignored because it requires a Chrome/Chromium install.
#[tokio::test]
#[ignore]
async fn session_drives_a_real_page() {
    if !browser_available() {
        eprintln!("Skipping: no Chromium binary in PATH");
        return;
    }

    let base_url = serve_page().await;
    let config = SmokeConfig {
        base_url: base_url.clone(),
        wait_timeout: Duration::from_millis(500),
        ..SmokeConfig::default()
    };

    let session = BrowserSession::launch(&config).await.unwrap();
    session.navigate(&base_url).await.unwrap();

    assert_eq!(session.title().await.unwrap(), "Stub Gallery");
    assert_eq!(session.count("button").await.unwrap(), 2);
    assert!(session.is_visible("#visible").await.unwrap());
    assert!(!session.is_visible("#hidden").await.unwrap());

    let heading = session.text("h1").await.unwrap();
    assert_eq!(heading.as_deref(), Some("Hello"));

    let bbox = session.bounding_box("#visible").await.unwrap().unwrap();
    assert!(bbox.width > 0.0 && bbox.height > 0.0, "degenerate box: {}", bbox);

    session.wait_for("#visible", Visibility::Visible).await.unwrap();
    session.wait_for("#hidden", Visibility::Hidden).await.unwrap();
    let found = session.try_wait_for("#absent", Visibility::Visible).await.unwrap();
    assert!(!found, "a selector with no element should time out quietly");

    session.set_viewport(ViewportPreset::Mobile).await.unwrap();
    let png = session.screenshot().await.unwrap();
    assert!(png.len() > 1_000, "expected a real PNG, got {} bytes", png.len());

    session.close().await;
}
