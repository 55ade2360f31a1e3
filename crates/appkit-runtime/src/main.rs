//! # AppKit Runtime
//!
//! Loads a client configuration, builds every subsystem and prints the
//! WalletConnect proposal the client would send.
//!
//! ## Usage
//!
//! ```text
//! appkit-runtime [CONFIG]    # default: appkit.toml, or APPKIT_CONFIG
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `APPKIT_*` overrides)
//! 2. Initialize telemetry
//! 3. Build the client and register provider listeners
//! 4. Restore connections
//! 5. Print the proposal namespaces as JSON

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ak_04_provider_bridge::InMemoryUniversalProvider;
use appkit_runtime::{AppKit, AppKitConfig};
use appkit_telemetry::init_telemetry;

const DEFAULT_CONFIG_PATH: &str = "appkit.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("APPKIT_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = AppKitConfig::load(&path)?;
    let _telemetry = init_telemetry(&config.telemetry)?;
    info!("[runtime] AppKit runtime v{} ({})", appkit_runtime::VERSION, path);

    // No relay transport in this binary: the in-memory provider stands in.
    let provider = Arc::new(InMemoryUniversalProvider::new());
    let appkit = Arc::new(AppKit::new(config, provider)?);
    appkit.start();

    let reports = appkit.sync_connections().await;
    for (namespace, report) in &reports {
        info!(
            "[runtime] {}: {} connections, {} skipped",
            namespace,
            report.connections().count(),
            report.skipped.len()
        );
    }

    let proposal = serde_json::to_string_pretty(&appkit.proposal_namespaces())
        .context("Failed to encode proposal namespaces")?;
    println!("{proposal}");

    appkit.stop();
    Ok(())
}
