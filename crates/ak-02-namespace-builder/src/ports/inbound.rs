//! # Inbound Ports
//!
//! API trait defining what the Namespace Builder can do.

use appkit_types::{CaipNetwork, NamespaceConfig, SessionNamespaces};

/// Namespace builder API - inbound port.
pub trait NamespaceBuilderApi: Send + Sync {
    /// Proposal namespaces for the requested networks.
    fn create_namespaces(&self, networks: &[CaipNetwork]) -> NamespaceConfig;

    /// Every chain implicated by an established session.
    fn chains_from_session(&self, namespaces: &SessionNamespaces) -> Vec<String>;
}
