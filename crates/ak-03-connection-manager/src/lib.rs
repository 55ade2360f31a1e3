//! # AK-03 Connection Manager
//!
//! Reconciles which wallets are connected on a chain namespace.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! On startup the application asks every previously-connected connector
//! whether it still holds an authorized session. Probes run concurrently
//! and are isolated: a wallet that throws is reported in the
//! [`SyncReport`] and never prevents discovery of the others.
//!
//! | Namespace | Probe |
//! |-----------|-------|
//! | any (WalletConnect) | accounts of the established session |
//! | `eip155` | `eth_accounts` + `eth_chainId` |
//! | `solana` | `connect(chain)` |
//! | `bip122` | `connect` + purposed addresses |
//!
//! ## Module Structure
//!
//! ```text
//! ak-03-connection-manager/
//! ├── domain/      # errors, probe state machine, resolution rules
//! ├── ports/       # ConnectionManagerApi, ConnectionStatusSource
//! └── service.rs   # ConnectionManager
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    bitcoin_accounts, get_connection, wallet_connect_connection, ConnectionError,
    ConnectionState, GetConnectionParams, ProbeEvent, ResolvedConnection,
};
pub use ports::{
    ConnectionManagerApi, ConnectionStatus, ConnectionStatusSource, InMemoryConnectionStatus,
    ProbeOutcome, SyncParams, SyncReport,
};
pub use service::ConnectionManager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
