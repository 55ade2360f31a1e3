//! Connection Manager Service
//!
//! One manager per chain namespace. A sync fans out one probe per
//! qualifying connector; each probe runs its steps in sequence and its
//! failure is recorded without affecting the others.

use crate::domain::{
    bitcoin_accounts, get_connection, wallet_connect_connection, ConnectionError, ConnectionState,
    GetConnectionParams, ProbeEvent, ResolvedConnection,
};
use crate::ports::inbound::{ConnectionManagerApi, ProbeOutcome, SyncParams, SyncReport};
use appkit_bus::{AppKitEvent, EventPublisher, InMemoryEventBus};
use appkit_types::{
    is_lower_case_match, Account, ChainNamespace, Connection, Connector, ProviderHandle,
    AUTH_CONNECTOR_ID, WALLET_CONNECT_CONNECTOR_ID,
};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ManagerState {
    connections: Vec<Connection>,
    states: HashMap<String, ConnectionState>,
}

/// Connection Manager implementation
pub struct ConnectionManager {
    namespace: ChainNamespace,
    state: RwLock<ManagerState>,
    event_bus: Option<Arc<InMemoryEventBus>>,
}

impl ConnectionManager {
    /// Manager for `namespace`.
    #[must_use]
    pub fn new(namespace: ChainNamespace) -> Self {
        Self {
            namespace,
            state: RwLock::new(ManagerState::default()),
            event_bus: None,
        }
    }

    /// Publish connection events on `bus`.
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<InMemoryEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Namespace served by this manager.
    #[must_use]
    pub fn namespace(&self) -> &ChainNamespace {
        &self.namespace
    }

    fn is_supported(&self) -> bool {
        matches!(
            self.namespace,
            ChainNamespace::Eip155 | ChainNamespace::Solana | ChainNamespace::Bip122
        )
    }

    fn emit(&self, event: AppKitEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }

    fn transition(&self, connector_id: &str, event: ProbeEvent) -> ConnectionState {
        let mut state = self.state.write();
        let entry = state.states.entry(connector_id.to_string()).or_default();
        *entry = entry.next(event);
        *entry
    }

    fn record(&self, connection: &Connection, params: &SyncParams) {
        self.upsert_connection(connection.clone());
        self.emit(AppKitEvent::ConnectionEstablished {
            namespace: self.namespace.clone(),
            connector_id: connection.connector_id.clone(),
            account_count: connection.accounts.len(),
            caip_network_id: connection.caip_network.as_ref().map(|n| n.caip_network_id()),
        });
        if let Some(callback) = &params.on_connection {
            callback(connection);
        }
    }

    async fn probe(&self, connector: &Connector, params: &SyncParams) -> ProbeOutcome {
        self.transition(&connector.id, ProbeEvent::Start);

        let outcome = match self.probe_connector(connector, params).await {
            Ok(Some(connection)) => {
                self.record(&connection, params);
                ProbeOutcome::Connected(connection)
            }
            Ok(None) => ProbeOutcome::Empty,
            Err(error) => {
                warn!(
                    connector_id = %connector.id,
                    namespace = %self.namespace,
                    error = %error,
                    "[ak-03] Connector probe failed"
                );
                self.emit(AppKitEvent::ProbeFailed {
                    namespace: self.namespace.clone(),
                    connector_id: connector.id.clone(),
                    reason: error.to_string(),
                });
                ProbeOutcome::Failed(error)
            }
        };

        let event = match outcome {
            ProbeOutcome::Connected(_) => ProbeEvent::Succeeded,
            _ => ProbeEvent::Failed,
        };
        let state = self.transition(&connector.id, event);
        debug!("[ak-03] {} settled as {:?}", connector.id, state);
        outcome
    }

    async fn probe_connector(
        &self,
        connector: &Connector,
        params: &SyncParams,
    ) -> Result<Option<Connection>, ConnectionError> {
        if connector.id == WALLET_CONNECT_CONNECTOR_ID {
            let accounts = params
                .universal_provider
                .as_ref()
                .and_then(|p| p.session())
                .map(|s| s.accounts(&self.namespace).to_vec())
                .unwrap_or_default();
            return Ok(wallet_connect_connection(
                &connector.id,
                &self.namespace,
                &accounts,
                &params.caip_networks,
            ));
        }

        let provider = connector
            .provider
            .as_ref()
            .ok_or_else(|| ConnectionError::NoProvider(connector.id.clone()))?;

        let connection = match &self.namespace {
            ChainNamespace::Eip155 => self.probe_evm(connector, provider, params).await?,
            ChainNamespace::Solana => self.probe_solana(connector, provider, params).await?,
            ChainNamespace::Bip122 => self.probe_bitcoin(connector, provider, params).await?,
            other => return Err(ConnectionError::UnsupportedNamespace(other.clone())),
        };

        if connection.is_some() && connector.id != AUTH_CONNECTOR_ID {
            if let Some(listen) = &params.on_listen_provider {
                listen(&connector.id, provider);
            }
        }

        Ok(connection)
    }

    async fn probe_evm(
        &self,
        connector: &Connector,
        provider: &ProviderHandle,
        params: &SyncParams,
    ) -> Result<Option<Connection>, ConnectionError> {
        let data = provider.fetch_provider_data().await;
        let Some(chain_id) = data.chain_id.filter(|_| !data.accounts.is_empty()) else {
            return Ok(None);
        };

        let caip_network = params
            .caip_networks
            .iter()
            .find(|n| n.chain_namespace == self.namespace && n.id == chain_id)
            .cloned();
        let accounts = data.accounts.into_iter().map(Account::new).collect();

        Ok(Some(Connection::new(connector.id.clone(), accounts, caip_network)))
    }

    async fn probe_solana(
        &self,
        connector: &Connector,
        provider: &ProviderHandle,
        params: &SyncParams,
    ) -> Result<Option<Connection>, ConnectionError> {
        let caip_network = params
            .caip_networks
            .iter()
            .find(|n| n.chain_namespace == self.namespace)
            .cloned();
        let address = provider
            .connect(caip_network.as_ref().map(|n| n.id.as_str()))
            .await?;
        if address.is_empty() {
            return Ok(None);
        }

        Ok(Some(Connection::new(
            connector.id.clone(),
            vec![Account::new(address)],
            caip_network,
        )))
    }

    async fn probe_bitcoin(
        &self,
        connector: &Connector,
        provider: &ProviderHandle,
        params: &SyncParams,
    ) -> Result<Option<Connection>, ConnectionError> {
        let caip_network = provider
            .chains()
            .into_iter()
            .find(|chain| {
                params
                    .caip_networks
                    .iter()
                    .any(|n| n.caip_network_id() == chain.caip_network_id())
            })
            .ok_or_else(|| ConnectionError::NoSupportedChain {
                connector_id: connector.id.clone(),
            })?;

        let address = provider.connect(Some(caip_network.id.as_str())).await?;
        if address.is_empty() {
            return Ok(None);
        }
        let reported = provider.get_account_addresses().await?;
        let accounts = bitcoin_accounts(&address, reported);
        if accounts.is_empty() {
            return Ok(None);
        }

        Ok(Some(Connection::new(
            connector.id.clone(),
            accounts,
            Some(caip_network),
        )))
    }
}

#[async_trait]
impl ConnectionManagerApi for ConnectionManager {
    async fn sync_connections(&self, params: SyncParams) -> Result<SyncReport, ConnectionError> {
        let mut report = SyncReport::default();
        let mut qualifying = Vec::new();

        for connector in &params.connectors {
            let Some(member) = connector.for_namespace(&self.namespace) else {
                continue;
            };
            if params.status.status(&member.id).should_probe() {
                qualifying.push(member.clone());
            } else {
                report.skipped.push(member.id.clone());
            }
        }

        if !self.is_supported() && qualifying.iter().any(|c| c.id != WALLET_CONNECT_CONNECTOR_ID) {
            return Err(ConnectionError::UnsupportedNamespace(self.namespace.clone()));
        }

        info!(
            "[ak-03] Syncing {} connectors on {} ({} skipped)",
            qualifying.len(),
            self.namespace,
            report.skipped.len()
        );

        let outcomes = join_all(qualifying.iter().map(|c| self.probe(c, &params))).await;
        report.outcomes = qualifying
            .into_iter()
            .map(|c| c.id)
            .zip(outcomes)
            .collect();

        Ok(report)
    }

    fn get_connection(
        &self,
        connector_id: Option<&str>,
        address: Option<&str>,
        connectors: &[Connector],
    ) -> Option<ResolvedConnection> {
        let state = self.state.read();
        get_connection(GetConnectionParams {
            connector_id,
            address,
            connections: &state.connections,
            connectors,
        })
    }

    fn connector_state(&self, connector_id: &str) -> ConnectionState {
        self.state
            .read()
            .states
            .get(connector_id)
            .copied()
            .unwrap_or_default()
    }

    fn connections(&self) -> Vec<Connection> {
        self.state.read().connections.clone()
    }

    fn upsert_connection(&self, connection: Connection) {
        let mut state = self.state.write();
        state
            .connections
            .retain(|c| !is_lower_case_match(&c.connector_id, &connection.connector_id));
        if connection.accounts.is_empty() {
            debug!("[ak-03] Dropped empty connection for {}", connection.connector_id);
            return;
        }
        state.connections.push(connection);
    }

    fn remove_connection(&self, connector_id: &str) -> Option<Connection> {
        let removed = {
            let mut state = self.state.write();
            let index = state
                .connections
                .iter()
                .position(|c| is_lower_case_match(&c.connector_id, connector_id))?;
            state.connections.remove(index)
        };

        self.emit(AppKitEvent::ConnectionRemoved {
            namespace: self.namespace.clone(),
            connector_id: removed.connector_id.clone(),
        });
        Some(removed)
    }

    async fn disconnect(
        &self,
        connector_id: &str,
        connectors: &[Connector],
    ) -> Result<(), ConnectionError> {
        let connector = connectors
            .iter()
            .filter_map(|c| c.for_namespace(&self.namespace))
            .find(|c| is_lower_case_match(&c.id, connector_id))
            .ok_or_else(|| ConnectionError::ConnectorNotFound(connector_id.to_string()))?;

        let result = match &connector.provider {
            Some(provider) => provider.disconnect().await,
            None => Ok(()),
        };

        // Settle locally even when the wallet fails to disconnect.
        self.transition(&connector.id, ProbeEvent::Disconnect);
        self.remove_connection(&connector.id);
        info!("[ak-03] Disconnected {} on {}", connector.id, self.namespace);

        result.map_err(ConnectionError::from)
    }
}
