//! # AK-05 SIWX Engine
//!
//! Sign-In-With-X: challenge messages, session storage policy and the two
//! authentication transports.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! The engine asks a pluggable [`SiwxConfig`] for a CAIP-122 message, has
//! the wallet sign it and hands the signed session back to the config.
//! Everything the engine needs from the surrounding application (the
//! active account, signing, the prompt, network switching) goes through
//! [`SiwxHost`].
//!
//! | Transport | Trigger | Session source |
//! |-----------|---------|----------------|
//! | Post-connect challenge | `initialize_if_enabled` | `request_sign_message` |
//! | WalletConnect authenticate | `universal_provider_authenticate` | returned CACAOs |
//! | Embedded wallet | `auth_connector_authenticate` | signed during connect |
//!
//! With no config installed the engine is disabled and every operation is
//! a no-op.
//!
//! ## Module Structure
//!
//! ```text
//! ak-05-siwx/
//! ├── adapters/    # InMemorySiwxConfig
//! ├── domain/      # SiwxMessage, SiwxSession, SiwxError
//! ├── ports/
//! │   ├── inbound.rs   # SiwxEngineApi
//! │   └── outbound.rs  # SiwxConfig, SiwxHost, AuthConnector
//! └── service.rs   # SiwxEngine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemorySiwxConfig;
pub use domain::{
    SiwxError, SiwxIdentifier, SiwxInput, SiwxMessage, SiwxMessageData, SiwxMetadata,
    SiwxSession, ACCOUNT_ADDRESS_PLACEHOLDER,
};
pub use ports::{
    AuthConnectRequest, AuthConnectResult, AuthConnector, HostCall, MockSiwxHost,
    SerializedSiwxMessage, SiwxConfig, SiwxEngineApi, SiwxHost,
};
pub use service::SiwxEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
