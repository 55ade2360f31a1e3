//! # AK-02 Namespace Builder
//!
//! WalletConnect namespace negotiation.
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! - Build the proposal `NamespaceConfig` (methods, events, chains, rpc
//!   map per chain namespace) from the requested networks.
//! - Apply application overrides without mutating the generated config.
//! - Derive chain ids from established session namespaces.
//! - Helper predicates for session payloads, user rejections and origin
//!   allowlists.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    apply_namespace_overrides, create_default_namespace, get_methods_by_chain_namespace,
    is_origin_allowed, is_session_event_data, is_user_rejected_request_error,
    NamespaceOverrides, DEFAULT_EVENTS,
};
pub use ports::NamespaceBuilderApi;
pub use service::{create_namespaces, get_chains_from_namespaces, NamespaceBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
