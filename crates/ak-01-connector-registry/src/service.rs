//! Connector Registry Service
//!
//! Holds the raw connector list and the memoized merged view. Every
//! mutation recomputes the merged view and notifies observers.

use crate::domain::{
    extend_with_explorer_wallets, flatten_connectors, merge_multi_chain_connectors,
};
use crate::ports::inbound::ConnectorRegistryApi;
use crate::ports::outbound::{ConnectorStorage, InMemoryConnectorStorage};
use appkit_bus::{AppKitEvent, EventPublisher, InMemoryEventBus, ObserverHandle, Observers};
use appkit_types::{ChainNamespace, Connector, ExplorerWallet, AUTH_CONNECTOR_ID};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Internal registry state
#[derive(Default)]
struct RegistryState {
    /// Single-namespace connectors in registration order
    all_connectors: Vec<Connector>,
    /// Memoized merged view over enabled namespaces
    merged: Vec<Connector>,
    /// Namespace used by scoped lookups
    active_namespace: Option<ChainNamespace>,
    /// Explicit namespace toggles
    namespace_filter: BTreeMap<ChainNamespace, bool>,
    /// Whether namespaces absent from the filter are enabled
    default_enabled: bool,
    /// Active connector per namespace
    active_connector_ids: BTreeMap<ChainNamespace, String>,
}

impl RegistryState {
    fn is_enabled(&self, namespace: &ChainNamespace) -> bool {
        self.namespace_filter
            .get(namespace)
            .copied()
            .unwrap_or(self.default_enabled)
    }

    fn recompute(&mut self) {
        let enabled: Vec<Connector> = self
            .all_connectors
            .iter()
            .filter(|c| self.is_enabled(&c.chain))
            .cloned()
            .collect();
        self.merged = merge_multi_chain_connectors(&enabled);
    }

    fn scoped<'a>(
        &'a self,
        namespace: Option<&'a ChainNamespace>,
    ) -> impl Iterator<Item = &'a Connector> + 'a {
        let namespace = namespace.or(self.active_namespace.as_ref());
        self.all_connectors
            .iter()
            .filter(move |c| Some(&c.chain) == namespace)
    }
}

/// Connector Registry implementation
pub struct ConnectorRegistry {
    state: RwLock<RegistryState>,
    storage: Arc<dyn ConnectorStorage>,
    observers: Observers<Vec<Connector>>,
    event_bus: Option<Arc<InMemoryEventBus>>,
}

impl ConnectorRegistry {
    /// Create a registry backed by process-local storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Arc::new(InMemoryConnectorStorage::new()))
    }

    /// Create a registry backed by `storage`.
    pub fn with_storage(storage: Arc<dyn ConnectorStorage>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                default_enabled: true,
                ..Default::default()
            }),
            storage,
            observers: Observers::new(),
            event_bus: None,
        }
    }

    /// Publish registry events on `bus`.
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<InMemoryEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Restore persisted connector ids for `namespaces`.
    pub fn initialize(&self, namespaces: &[ChainNamespace]) {
        for namespace in namespaces {
            if let Some(id) = self.storage.get_connected_connector_id(namespace) {
                debug!("[ak-01] Restored connector {} for {}", id, namespace);
                self.state
                    .write()
                    .active_connector_ids
                    .insert(namespace.clone(), id);
            }
        }
    }

    /// Namespace used when lookups omit one.
    pub fn set_active_namespace(&self, namespace: Option<ChainNamespace>) {
        self.state.write().active_namespace = namespace;
    }

    /// Current active namespace.
    #[must_use]
    pub fn active_namespace(&self) -> Option<ChainNamespace> {
        self.state.read().active_namespace.clone()
    }

    /// Enable or disable one namespace in the merged view.
    pub fn filter_by_namespace(&self, namespace: ChainNamespace, enabled: bool) {
        {
            let mut state = self.state.write();
            state.namespace_filter.insert(namespace, enabled);
            state.recompute();
        }
        self.publish_merged();
    }

    /// Enable exactly `namespaces` in the merged view.
    pub fn filter_by_namespaces(&self, namespaces: &[ChainNamespace]) {
        {
            let mut state = self.state.write();
            state.default_enabled = false;
            state.namespace_filter = namespaces.iter().map(|ns| (ns.clone(), true)).collect();
            state.recompute();
        }
        self.publish_merged();
    }

    /// Namespaces currently enabled among those with connectors.
    #[must_use]
    pub fn enabled_namespaces(&self) -> Vec<ChainNamespace> {
        let state = self.state.read();
        let mut namespaces: Vec<ChainNamespace> = Vec::new();
        for connector in &state.all_connectors {
            if state.is_enabled(&connector.chain) && !namespaces.contains(&connector.chain) {
                namespaces.push(connector.chain.clone());
            }
        }
        namespaces
    }

    /// Forget every active connector id (not the persisted ones).
    pub fn reset_connector_ids(&self) {
        self.state.write().active_connector_ids.clear();
    }

    fn publish_merged(&self) {
        let merged = self.state.read().merged.clone();
        debug!("[ak-01] Merged view recomputed: {} connectors", merged.len());
        if let Some(bus) = &self.event_bus {
            bus.emit(AppKitEvent::ConnectorsChanged {
                count: merged.len(),
            });
        }
        self.observers.notify(&merged);
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorRegistryApi for ConnectorRegistry {
    fn add_connector(&self, connector: Connector) {
        info!(
            "[ak-01] Adding connector {} ({:?}) on {}",
            connector.id, connector.connector_type, connector.chain
        );
        {
            let mut state = self.state.write();
            state.all_connectors.extend(flatten_connectors(vec![connector]));
            state.recompute();
        }
        self.publish_merged();
    }

    fn set_connectors(&self, connectors: Vec<Connector>) {
        {
            let mut state = self.state.write();
            state.all_connectors = flatten_connectors(connectors);
            state.recompute();
        }
        self.publish_merged();
    }

    fn get_connector(&self, id: &str, namespace: Option<&ChainNamespace>) -> Option<Connector> {
        let state = self.state.read();
        let found = state
            .scoped(namespace)
            .find(|c| c.id == id || c.explorer_id.as_deref() == Some(id))
            .cloned();
        found
    }

    fn get_connector_by_rdns(
        &self,
        rdns: &str,
        namespace: Option<&ChainNamespace>,
    ) -> Option<Connector> {
        let state = self.state.read();
        let found = state
            .scoped(namespace)
            .find(|c| c.rdns() == Some(rdns))
            .cloned();
        found
    }

    fn get_connector_by_id(&self, id: &str) -> Option<Connector> {
        self.state
            .read()
            .all_connectors
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    fn get_connectors(&self) -> Vec<Connector> {
        self.state.read().merged.clone()
    }

    fn get_connectors_by_namespace(&self, namespace: &ChainNamespace) -> Vec<Connector> {
        let state = self.state.read();
        let in_namespace: Vec<Connector> = state
            .all_connectors
            .iter()
            .filter(|c| &c.chain == namespace)
            .cloned()
            .collect();
        merge_multi_chain_connectors(&in_namespace)
    }

    fn extend_connectors_with_explorer_wallets(&self, wallets: &[ExplorerWallet]) {
        if wallets.is_empty() {
            return;
        }
        let matched = {
            let mut state = self.state.write();
            let matched = extend_with_explorer_wallets(&mut state.all_connectors, wallets);
            state.recompute();
            matched
        };
        debug!(
            "[ak-01] Matched {} connectors against {} explorer wallets",
            matched,
            wallets.len()
        );
        self.publish_merged();
    }

    fn get_auth_connector(&self, namespace: Option<&ChainNamespace>) -> Option<Connector> {
        let state = self.state.read();
        let namespace = namespace.or(state.active_namespace.as_ref());
        let auth = state.merged.iter().find(|c| c.id == AUTH_CONNECTOR_ID)?;

        if auth.connectors.is_empty() {
            return Some(auth.clone());
        }
        auth.connectors
            .iter()
            .find(|c| Some(&c.chain) == namespace)
            .cloned()
    }

    fn set_connector_id(&self, connector_id: &str, namespace: &ChainNamespace) {
        if connector_id.is_empty() {
            return;
        }
        self.state
            .write()
            .active_connector_ids
            .insert(namespace.clone(), connector_id.to_string());
        self.storage
            .set_connected_connector_id(namespace, connector_id);

        debug!("[ak-01] Active connector for {} is {}", namespace, connector_id);
        if let Some(bus) = &self.event_bus {
            bus.emit(AppKitEvent::ActiveConnectorChanged {
                namespace: namespace.clone(),
                connector_id: Some(connector_id.to_string()),
            });
        }
    }

    fn remove_connector_id(&self, namespace: &ChainNamespace) {
        self.state.write().active_connector_ids.remove(namespace);
        self.storage.delete_connected_connector_id(namespace);

        if let Some(bus) = &self.event_bus {
            bus.emit(AppKitEvent::ActiveConnectorChanged {
                namespace: namespace.clone(),
                connector_id: None,
            });
        }
    }

    fn get_connector_id(&self, namespace: &ChainNamespace) -> Option<String> {
        self.state.read().active_connector_ids.get(namespace).cloned()
    }

    fn is_connected(&self, namespace: Option<&ChainNamespace>) -> bool {
        let state = self.state.read();
        match namespace {
            Some(ns) => state.active_connector_ids.contains_key(ns),
            None => !state.active_connector_ids.is_empty(),
        }
    }

    fn subscribe(&self, callback: Box<dyn Fn(&Vec<Connector>) + Send + Sync>) -> ObserverHandle {
        self.observers.subscribe(callback)
    }
}
