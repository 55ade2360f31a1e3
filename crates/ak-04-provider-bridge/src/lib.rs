//! # AK-04 Provider Event Bridge
//!
//! Opt-in subscriptions to WalletConnect universal provider lifecycle
//! events.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! A caller supplies callbacks for the events it cares about and gets a
//! [`ProviderSubscription`] back. Each provider event is re-dispatched
//! synchronously, at most once, with no retries. `accountsChanged`
//! carries bare addresses; the bridge rebuilds CAIP-10 accounts from the
//! session on the namespace's default chain.
//!
//! ## Module Structure
//!
//! ```text
//! ak-04-provider-bridge/
//! ├── adapters/    # InMemoryUniversalProvider
//! ├── ports/       # ListenParams, ProviderEventBridgeApi
//! └── service.rs   # ProviderEventBridge, ProviderSubscription
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryUniversalProvider;
pub use ports::{ListenParams, ProviderEventBridgeApi};
pub use service::{
    get_wallet_connect_accounts, resolve_changed_accounts, ProviderEventBridge,
    ProviderSubscription,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
