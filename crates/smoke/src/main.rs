//! PhotoWallet smoke harness entry point
//!
//! Run with: cargo run -p photowallet-smoke
//!
//! Exits 0 when every check passed, 1 when a check failed, and 2 when
//! the run could not start at all (no server, no browser).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use photowallet_smoke::{Harness, RunReport, SmokeConfig, SmokeError, SmokeResult};

#[derive(Parser, Debug)]
#[command(name = "photowallet-smoke")]
#[command(about = "Browser smoke checks for the PhotoWallet PWA")]
struct Args {
    /// Base URL of the running PhotoWallet server
    #[arg(long, default_value = "http://localhost:5001")]
    base_url: String,

    /// Directory for screenshots (defaults to the system temp dir)
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Seconds to wait for the server before giving up
    #[arg(long, default_value = "10")]
    probe_timeout: u64,

    /// Seconds to wait for an element condition
    #[arg(long, default_value = "5")]
    wait_timeout: u64,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = match e {
                SmokeError::ServerUnreachable { .. } | SmokeError::Launch(_) => 2,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

async fn async_main(args: Args) -> SmokeResult<RunReport> {
    let mut config = SmokeConfig {
        base_url: args.base_url,
        headed: args.headed,
        probe_timeout: Duration::from_secs(args.probe_timeout),
        wait_timeout: Duration::from_secs(args.wait_timeout),
        ..SmokeConfig::default()
    };
    if let Some(dir) = args.artifact_dir {
        config.artifact_dir = dir;
    }

    let harness = Harness::new(config)?;
    harness.run().await
}
