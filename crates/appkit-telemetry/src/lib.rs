//! # AppKit Telemetry
//!
//! Structured logging setup for the connection core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use appkit_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs from every ak-* crate are now collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `APPKIT_SERVICE_NAME` | `appkit` | Service name in records |
//! | `APPKIT_LOG_LEVEL` | `info` | Filter directive (`RUST_LOG` as fallback) |
//! | `APPKIT_CONSOLE_OUTPUT` | `true` | Write records to stdout |
//! | `APPKIT_JSON_LOGS` | `false` | JSON records (`true` inside containers) |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
mod subscriber;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use subscriber::build_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// The filter directive does not parse.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber.
///
/// Returns a guard that should be held for the lifetime of the
/// application. Fails when another subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    subscriber::init_subscriber(config)?;
    Ok(TelemetryGuard {
        service_name: config.full_service_name(),
    })
}

/// Guard that keeps telemetry active. Logs the shutdown on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service name the subscriber was installed for.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use appkit_telemetry::subsystem_span;
///
/// async fn sync() {
///     let _span = subsystem_span!("sync_connections", subsystem = "ak-03", namespace = "eip155");
///     // ... probing
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
