//! # Outbound Ports
//!
//! Persistence of the last-used connector per namespace.

use appkit_types::ChainNamespace;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Connector id storage - outbound port.
pub trait ConnectorStorage: Send + Sync {
    /// Persisted connector id of `namespace`.
    fn get_connected_connector_id(&self, namespace: &ChainNamespace) -> Option<String>;

    /// Persist the connector id of `namespace`.
    fn set_connected_connector_id(&self, namespace: &ChainNamespace, connector_id: &str);

    /// Forget the connector id of `namespace`.
    fn delete_connected_connector_id(&self, namespace: &ChainNamespace);
}

/// Process-local storage.
#[derive(Default)]
pub struct InMemoryConnectorStorage {
    ids: RwLock<HashMap<ChainNamespace, String>>,
}

impl InMemoryConnectorStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage, as if restored from a previous run.
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ChainNamespace, String)>,
    {
        Self {
            ids: RwLock::new(entries.into_iter().collect()),
        }
    }
}

impl ConnectorStorage for InMemoryConnectorStorage {
    fn get_connected_connector_id(&self, namespace: &ChainNamespace) -> Option<String> {
        self.ids.read().get(namespace).cloned()
    }

    fn set_connected_connector_id(&self, namespace: &ChainNamespace, connector_id: &str) {
        self.ids
            .write()
            .insert(namespace.clone(), connector_id.to_string());
    }

    fn delete_connected_connector_id(&self, namespace: &ChainNamespace) {
        self.ids.write().remove(namespace);
    }
}
