//! # Inbound Ports
//!
//! API trait defining what the Connector Registry can do.

use appkit_bus::ObserverHandle;
use appkit_types::{ChainNamespace, Connector, ExplorerWallet};

/// Connector registry API - inbound port.
pub trait ConnectorRegistryApi: Send + Sync {
    /// Append a connector and recompute the merged view.
    fn add_connector(&self, connector: Connector);

    /// Replace the raw list and recompute the merged view.
    fn set_connectors(&self, connectors: Vec<Connector>);

    /// Raw connector with this id (or explorer id) in `namespace`, or in the
    /// active namespace when omitted.
    fn get_connector(&self, id: &str, namespace: Option<&ChainNamespace>) -> Option<Connector>;

    /// Raw connector with this rdns in `namespace` or the active namespace.
    fn get_connector_by_rdns(&self, rdns: &str, namespace: Option<&ChainNamespace>)
        -> Option<Connector>;

    /// Raw connector with this id in any namespace.
    fn get_connector_by_id(&self, id: &str) -> Option<Connector>;

    /// The merged view.
    fn get_connectors(&self) -> Vec<Connector>;

    /// Merged view of one namespace.
    fn get_connectors_by_namespace(&self, namespace: &ChainNamespace) -> Vec<Connector>;

    /// Attach explorer catalog metadata.
    fn extend_connectors_with_explorer_wallets(&self, wallets: &[ExplorerWallet]);

    /// Embedded-auth connector for `namespace` or the active namespace.
    fn get_auth_connector(&self, namespace: Option<&ChainNamespace>) -> Option<Connector>;

    /// Mark `connector_id` as the active connector of `namespace`.
    fn set_connector_id(&self, connector_id: &str, namespace: &ChainNamespace);

    /// Clear the active connector of `namespace`.
    fn remove_connector_id(&self, namespace: &ChainNamespace);

    /// Active connector id of `namespace`.
    fn get_connector_id(&self, namespace: &ChainNamespace) -> Option<String>;

    /// Whether `namespace` (or any namespace) has an active connector.
    fn is_connected(&self, namespace: Option<&ChainNamespace>) -> bool;

    /// Be notified with the merged view after every recompute.
    fn subscribe(&self, callback: Box<dyn Fn(&Vec<Connector>) + Send + Sync>) -> ObserverHandle;
}
