//! # Client Container
//!
//! Configuration and the container holding every subsystem instance.

pub mod appkit;
pub mod config;

pub use appkit::{AppKit, AppKitError};
pub use config::{AppKitConfig, ConfigError, RpcSettings, SiwxSettings, PROJECT_ID_ENV};
