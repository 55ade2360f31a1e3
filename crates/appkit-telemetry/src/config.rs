//! Telemetry configuration from environment variables.

use serde::Deserialize;
use std::env;

/// Default service name in log records.
pub const DEFAULT_SERVICE_NAME: &str = "appkit";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every record
    pub service_name: String,

    /// Subsystem identifier (01-05), `00` for the whole runtime
    pub subsystem_id: String,

    /// Filter directive (trace, debug, info, warn, error or a full `EnvFilter` string)
    pub log_level: String,

    /// Whether to write records to stdout
    pub console_output: bool,

    /// Whether to emit JSON records instead of the human-readable format
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn is_falsy(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `APPKIT_SERVICE_NAME`: Service name (default: appkit)
    /// - `APPKIT_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `APPKIT_CONSOLE_OUTPUT`: Write to stdout (default: true)
    /// - `APPKIT_JSON_LOGS`: JSON records (default: false, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("APPKIT_SERVICE_NAME").unwrap_or(defaults.service_name),
            subsystem_id: defaults.subsystem_id,
            log_level: lookup("APPKIT_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("APPKIT_CONSOLE_OUTPUT")
                .map(|v| !is_falsy(&v))
                .unwrap_or(defaults.console_output),
            json_logs: lookup("APPKIT_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(is_container),
        }
    }

    /// Create configuration for a specific subsystem.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Self {
        let mut config = Self::from_env();
        config.subsystem_id = subsystem_id.to_string();
        config.service_name = format!("ak-{}-{}", subsystem_id, subsystem_name);
        config
    }

    /// Get the full service name including subsystem.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "00" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}
