//! # Inbound Ports
//!
//! API trait and request/response types of the Connection Manager.

use crate::domain::{ConnectionError, ConnectionState, ResolvedConnection};
use crate::ports::outbound::ConnectionStatusSource;
use appkit_types::{CaipNetwork, Connection, Connector, ProviderHandle, UniversalProvider};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Called with each connection a sync discovers.
pub type ConnectionCallback = Arc<dyn Fn(&Connection) + Send + Sync>;

/// Called with each connector whose provider should be listened to.
pub type ListenProviderCallback = Arc<dyn Fn(&str, &ProviderHandle) + Send + Sync>;

/// Inputs of one reconciliation pass.
#[derive(Clone)]
pub struct SyncParams {
    /// Candidate connectors; composites are resolved to their member for
    /// the manager's namespace.
    pub connectors: Vec<Connector>,
    /// Requested networks.
    pub caip_networks: Vec<CaipNetwork>,
    /// WalletConnect transport, when one is configured.
    pub universal_provider: Option<Arc<dyn UniversalProvider>>,
    /// Connection history.
    pub status: Arc<dyn ConnectionStatusSource>,
    /// Invoked per discovered connection.
    pub on_connection: Option<ConnectionCallback>,
    /// Invoked per provider that needs a live listener.
    pub on_listen_provider: Option<ListenProviderCallback>,
}

impl SyncParams {
    /// Sync over `connectors` for `caip_networks`.
    pub fn new(
        connectors: Vec<Connector>,
        caip_networks: Vec<CaipNetwork>,
        status: Arc<dyn ConnectionStatusSource>,
    ) -> Self {
        Self {
            connectors,
            caip_networks,
            universal_provider: None,
            status,
            on_connection: None,
            on_listen_provider: None,
        }
    }

    /// Read WalletConnect accounts from `provider`.
    #[must_use]
    pub fn with_universal_provider(mut self, provider: Arc<dyn UniversalProvider>) -> Self {
        self.universal_provider = Some(provider);
        self
    }

    /// Set the connection callback.
    #[must_use]
    pub fn on_connection<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Connection) + Send + Sync + 'static,
    {
        self.on_connection = Some(Arc::new(callback));
        self
    }

    /// Set the provider-listener callback.
    #[must_use]
    pub fn on_listen_provider<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &ProviderHandle) + Send + Sync + 'static,
    {
        self.on_listen_provider = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for SyncParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncParams")
            .field("connectors", &self.connectors.len())
            .field("caip_networks", &self.caip_networks.len())
            .field("universal_provider", &self.universal_provider.is_some())
            .finish_non_exhaustive()
    }
}

/// Result of probing one connector.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    /// The wallet is connected.
    Connected(Connection),
    /// The wallet answered without accounts or chain.
    Empty,
    /// The probe failed; siblings were still probed.
    Failed(ConnectionError),
}

/// Per-connector outcomes of a sync, in connector order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    /// `(connector_id, outcome)` for every probed connector.
    pub outcomes: Vec<(String, ProbeOutcome)>,
    /// Connectors skipped by their connection history.
    pub skipped: Vec<String>,
}

impl SyncReport {
    /// Connections discovered.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            ProbeOutcome::Connected(c) => Some(c),
            _ => None,
        })
    }

    /// Failed probes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ConnectionError)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            ProbeOutcome::Failed(e) => Some((id.as_str(), e)),
            _ => None,
        })
    }

    /// True when no probe failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Connection Manager API - inbound port.
#[async_trait]
pub trait ConnectionManagerApi: Send + Sync {
    /// Probe every qualifying connector and record live connections.
    async fn sync_connections(&self, params: SyncParams) -> Result<SyncReport, ConnectionError>;

    /// Resolve a stored connection against `connectors`.
    fn get_connection(
        &self,
        connector_id: Option<&str>,
        address: Option<&str>,
        connectors: &[Connector],
    ) -> Option<ResolvedConnection>;

    /// State of a connector.
    fn connector_state(&self, connector_id: &str) -> ConnectionState;

    /// Stored connections.
    fn connections(&self) -> Vec<Connection>;

    /// Store a connection, replacing the connector's previous one.
    fn upsert_connection(&self, connection: Connection);

    /// Drop a connector's connection.
    fn remove_connection(&self, connector_id: &str) -> Option<Connection>;

    /// Disconnect a connector's wallet and drop its connection.
    async fn disconnect(
        &self,
        connector_id: &str,
        connectors: &[Connector],
    ) -> Result<(), ConnectionError>;
}
