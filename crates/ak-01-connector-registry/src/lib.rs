//! # AK-01 Connector Registry
//!
//! Namespace-scoped registry of wallet connectors.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Holds one connector per wallet integration per chain namespace and
//! derives a merged view in which the same wallet across namespaces is a
//! single `MULTI_CHAIN` (or `AUTH`) composite.
//!
//! ## Module Structure
//!
//! ```text
//! ak-01-connector-registry/
//! ├── domain/      # merge fold, explorer matching
//! ├── ports/       # ConnectorRegistryApi, ConnectorStorage
//! └── service.rs   # ConnectorRegistry
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    find_explorer_wallet, merge_multi_chain_connectors, sort_connectors_by_explorer_wallet,
};
pub use ports::{ConnectorRegistryApi, ConnectorStorage, InMemoryConnectorStorage};
pub use service::ConnectorRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
