//! # AppKit Configuration
//!
//! Unified configuration for the client, loaded from TOML.
//!
//! ## Requirements
//!
//! - `project_id` MUST be set (config file or `APPKIT_PROJECT_ID`)
//! - At least one network MUST be requested
//! - SIWX needs a domain and URI when enabled

use ak_02_namespace_builder::NamespaceOverrides;
use anyhow::Context;
use appkit_telemetry::TelemetryConfig;
use appkit_types::{
    extend_caip_networks, networks, parse_caip_network_id, CaipNetwork, ChainNamespace,
    ExtendOptions, NetworkDescriptor, ParseError, RawNetwork,
};
use chrono::{TimeDelta, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding `project_id`.
pub const PROJECT_ID_ENV: &str = "APPKIT_PROJECT_ID";

/// Complete client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppKitConfig {
    /// Cloud project id.
    pub project_id: String,
    /// Requested well-known networks by CAIP-2 id, in priority order.
    pub networks: Vec<String>,
    /// Application-defined networks, requested after `networks`.
    pub custom_networks: Vec<RawNetwork>,
    /// Namespace shown first; the first network's namespace when absent.
    pub default_namespace: Option<ChainNamespace>,
    /// Replacements for the generated WalletConnect proposal.
    pub universal_provider_overrides: NamespaceOverrides,
    /// Sign-In-With-X settings.
    pub siwx: SiwxSettings,
    /// RPC and asset customization.
    pub rpc: RpcSettings,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

/// SIWX configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiwxSettings {
    /// Install the in-memory SIWX config.
    pub enabled: bool,
    /// A session is mandatory to stay connected.
    pub required: bool,
    /// Revoke sessions on disconnect.
    pub sign_out_on_disconnect: bool,
    /// Requesting domain.
    pub domain: String,
    /// Requesting URI.
    pub uri: String,
    /// Statement shown in messages.
    pub statement: Option<String>,
    /// Session lifetime; sessions never expire when absent.
    pub expiration_secs: Option<u64>,
}

impl SiwxSettings {
    /// Session lifetime, `None` when unset or when it would overflow a
    /// timestamp issued now.
    #[must_use]
    pub fn expiration(&self) -> Option<TimeDelta> {
        let secs = i64::try_from(self.expiration_secs?).ok()?;
        let lifetime = TimeDelta::try_seconds(secs)?;
        Utc::now().checked_add_signed(lifetime).map(|_| lifetime)
    }
}

impl Default for SiwxSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            required: false,
            sign_out_on_disconnect: true,
            domain: String::new(),
            uri: String::new(),
            statement: None,
            expiration_secs: None,
        }
    }
}

/// RPC configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// Extra RPC URLs per CAIP-2 id, tried before the proxy.
    pub custom_urls: BTreeMap<String, Vec<String>>,
    /// Custom network image URL per chain reference.
    pub network_image_urls: BTreeMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No project id.
    #[error("project_id is empty. Set APPKIT_PROJECT_ID or provide it in the config.")]
    EmptyProjectId,

    /// No network requested.
    #[error("At least one network must be configured")]
    NoNetworks,

    /// A requested id is not a well-known network.
    #[error("Unknown network {0}; declare it under [[custom_networks]]")]
    UnknownNetwork(String),

    /// A requested id does not parse.
    #[error(transparent)]
    InvalidNetworkId(#[from] ParseError),

    /// SIWX enabled without domain or URI.
    #[error("siwx.domain and siwx.uri are required when SIWX is enabled")]
    IncompleteSiwx,

    /// The default namespace has no requested network.
    #[error("Default namespace {0} has no configured network")]
    DefaultNamespaceNotConfigured(ChainNamespace),

    /// `siwx.expiration_secs` does not fit a timestamp.
    #[error("siwx.expiration_secs {0} is out of range")]
    ExpirationOutOfRange(u64),
}

impl AppKitConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(document: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(document)
    }

    /// Load, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&document)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup(PROJECT_ID_ENV).filter(|v| !v.is_empty()) {
            self.project_id = project_id;
        }
    }

    /// Validate configuration before building a client.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - `project_id` is empty
    /// - no network is configured, or an id is unknown or malformed
    /// - SIWX is enabled without domain and URI
    /// - the SIWX session lifetime overflows a timestamp
    /// - the default namespace has no network
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::EmptyProjectId);
        }
        let descriptors = self.descriptors()?;
        if descriptors.is_empty() {
            return Err(ConfigError::NoNetworks);
        }
        if self.siwx.enabled && (self.siwx.domain.is_empty() || self.siwx.uri.is_empty()) {
            return Err(ConfigError::IncompleteSiwx);
        }
        if let Some(secs) = self.siwx.expiration_secs {
            if self.siwx.expiration().is_none() {
                return Err(ConfigError::ExpirationOutOfRange(secs));
            }
        }
        if let Some(namespace) = &self.default_namespace {
            if !descriptors.iter().any(|d| &d.chain_namespace() == namespace) {
                return Err(ConfigError::DefaultNamespaceNotConfigured(namespace.clone()));
            }
        }
        Ok(())
    }

    /// Requested networks as descriptors, well-known ones first.
    pub fn descriptors(&self) -> Result<Vec<NetworkDescriptor>, ConfigError> {
        let mut descriptors = Vec::with_capacity(self.networks.len() + self.custom_networks.len());
        for id in &self.networks {
            let caip_network_id = parse_caip_network_id(id)?;
            let network = networks::find(&caip_network_id)
                .ok_or_else(|| ConfigError::UnknownNetwork(id.clone()))?;
            descriptors.push(NetworkDescriptor::Caip(network));
        }
        descriptors.extend(self.custom_networks.iter().cloned().map(NetworkDescriptor::Raw));
        Ok(descriptors)
    }

    /// Options for extending the requested networks.
    pub fn extend_options(&self) -> ExtendOptions {
        let mut options = ExtendOptions {
            project_id: self.project_id.clone(),
            custom_network_image_urls: self
                .rpc
                .network_image_urls
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..Default::default()
        };
        for (id, urls) in &self.rpc.custom_urls {
            match parse_caip_network_id(id) {
                Ok(caip_network_id) => {
                    options.custom_rpc_urls.insert(caip_network_id, urls.clone());
                }
                Err(e) => warn!(error = %e, "[runtime] Skipping custom RPC urls"),
            }
        }
        options
    }

    /// Requested networks, extended with RPC and image metadata.
    pub fn caip_networks(&self) -> Result<Vec<CaipNetwork>, ConfigError> {
        Ok(extend_caip_networks(&self.descriptors()?, &self.extend_options()))
    }

    /// Namespaces of the requested networks, in first-seen order.
    pub fn namespaces(&self) -> Result<Vec<ChainNamespace>, ConfigError> {
        let mut namespaces: Vec<ChainNamespace> = Vec::new();
        for descriptor in self.descriptors()? {
            let namespace = descriptor.chain_namespace();
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
        Ok(namespaces)
    }
}
