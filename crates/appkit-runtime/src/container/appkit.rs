//! # AppKit Container
//!
//! Holds every subsystem instance of one client and drives the
//! cross-subsystem flows: connecting, restoring and disconnecting.
//!
//! ## Initialization Order
//!
//! ```text
//! 1. Configuration validated, networks extended
//! 2. Event bus, connection history
//! 3. Connector registry (ak-01), filtered to the requested namespaces
//! 4. One connection manager per namespace (ak-03)
//! 5. Namespace builder (ak-02), provider event bridge (ak-04)
//! 6. Client state, SIWX engine (ak-05)
//! ```
//!
//! Provider listeners are registered by [`AppKit::start`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use ak_01_connector_registry::{ConnectorRegistry, ConnectorRegistryApi};
use ak_02_namespace_builder::{NamespaceBuilder, NamespaceBuilderApi};
use ak_03_connection_manager::{
    wallet_connect_connection, ConnectionError, ConnectionManager, ConnectionManagerApi,
    ConnectionStatusSource, InMemoryConnectionStatus, SyncParams, SyncReport,
};
use ak_04_provider_bridge::{ProviderEventBridge, ProviderSubscription};
use ak_05_siwx::{InMemorySiwxConfig, SiwxConfig, SiwxEngine, SiwxEngineApi, SiwxError, SiwxHost};
use appkit_bus::InMemoryEventBus;
use appkit_types::{
    parse_caip_address, Account, AccountType, CaipAddress, CaipNetwork, CaipNetworkId,
    ChainNamespace, Connection, Connector, NamespaceConfig, ProviderError, UniversalProvider,
    WALLET_CONNECT_CONNECTOR_ID,
};

use crate::adapters::{ClientState, Signer};
use crate::container::config::{AppKitConfig, ConfigError, SiwxSettings};
use crate::wiring;

/// Client-level errors.
#[derive(Debug, Error)]
pub enum AppKitError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A connection manager failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// SIWX failed.
    #[error(transparent)]
    Siwx(#[from] SiwxError),

    /// The wallet or transport failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No requested network or manager for the namespace.
    #[error("Namespace {0} is not configured")]
    NamespaceNotConfigured(ChainNamespace),

    /// No connector with that id.
    #[error("Connector not found: {0}")]
    ConnectorNotFound(String),

    /// The wallet approved no account of the namespace.
    #[error("No account returned for {0}")]
    NoAccount(ChainNamespace),
}

/// One AppKit client.
pub struct AppKit {
    /// Validated configuration.
    pub config: AppKitConfig,

    /// Requested networks, extended with RPC metadata.
    pub caip_networks: Vec<CaipNetwork>,

    /// Shared event bus.
    pub event_bus: Arc<InMemoryEventBus>,

    /// Connector registry (ak-01).
    pub registry: Arc<ConnectorRegistry>,

    /// Connection manager per namespace (ak-03).
    pub managers: BTreeMap<ChainNamespace, Arc<ConnectionManager>>,

    /// Proposal builder (ak-02).
    pub namespace_builder: NamespaceBuilder,

    /// WalletConnect event bridge (ak-04).
    pub bridge: ProviderEventBridge,

    /// WalletConnect transport.
    pub provider: Arc<dyn UniversalProvider>,

    /// Account, network and modal state.
    pub state: Arc<ClientState>,

    /// SIWX engine (ak-05); inert when SIWX is disabled.
    pub siwx: Arc<SiwxEngine>,

    /// Connection history consulted by syncs.
    pub status: Arc<InMemoryConnectionStatus>,

    subscriptions: Mutex<Vec<ProviderSubscription>>,
}

impl AppKit {
    /// Build a client over the WalletConnect `provider`.
    #[instrument(name = "appkit_init", skip_all)]
    pub fn new(
        config: AppKitConfig,
        provider: Arc<dyn UniversalProvider>,
    ) -> Result<Self, AppKitError> {
        config.validate()?;
        let caip_networks = config.caip_networks()?;
        let namespaces = config.namespaces()?;
        info!(
            "[runtime] Initializing AppKit with {} networks over {} namespaces",
            caip_networks.len(),
            namespaces.len()
        );

        let event_bus = Arc::new(InMemoryEventBus::new());
        let status = Arc::new(InMemoryConnectionStatus::new());

        let registry = ConnectorRegistry::new().with_event_bus(Arc::clone(&event_bus));
        registry.initialize(&namespaces);
        registry.set_active_namespace(
            config
                .default_namespace
                .clone()
                .or_else(|| namespaces.first().cloned()),
        );

        let managers = namespaces
            .iter()
            .map(|ns| {
                let manager =
                    ConnectionManager::new(ns.clone()).with_event_bus(Arc::clone(&event_bus));
                (ns.clone(), Arc::new(manager))
            })
            .collect();

        let namespace_builder = if config.universal_provider_overrides.is_empty() {
            NamespaceBuilder::new()
        } else {
            NamespaceBuilder::with_overrides(config.universal_provider_overrides.clone())
        };

        let bridge =
            ProviderEventBridge::new(Arc::clone(&provider)).with_event_bus(Arc::clone(&event_bus));
        let state = Arc::new(ClientState::new(caip_networks.clone(), Arc::clone(&event_bus)));

        let mut siwx = SiwxEngine::new(Arc::clone(&state) as Arc<dyn SiwxHost>)
            .with_event_bus(Arc::clone(&event_bus));
        if config.siwx.enabled {
            siwx = siwx.with_config(siwx_config(&config.siwx));
            info!("[runtime] SIWX enabled for {}", config.siwx.domain);
        }

        Ok(Self {
            config,
            caip_networks,
            event_bus,
            registry: Arc::new(registry),
            managers,
            namespace_builder,
            bridge,
            provider,
            state,
            siwx: Arc::new(siwx),
            status,
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    /// Replace the SIWX config, enabling SIWX.
    #[must_use]
    pub fn with_siwx_config(mut self, config: Arc<dyn SiwxConfig>) -> Self {
        let engine = SiwxEngine::new(Arc::clone(&self.state) as Arc<dyn SiwxHost>)
            .with_config(config)
            .with_event_bus(Arc::clone(&self.event_bus));
        self.siwx = Arc::new(engine);
        self
    }

    /// Register the WalletConnect provider listeners.
    pub fn start(self: &Arc<Self>) {
        let subscriptions = wiring::listen_provider_events(self);
        debug!(
            "[runtime] {} provider listeners registered",
            subscriptions.iter().map(ProviderSubscription::len).sum::<usize>()
        );
        *self.subscriptions.lock() = subscriptions;
    }

    /// Remove the provider listeners.
    pub fn stop(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.unsubscribe();
        }
    }

    /// Manager of `namespace`.
    pub fn manager(&self, namespace: &ChainNamespace) -> Result<&Arc<ConnectionManager>, AppKitError> {
        self.managers
            .get(namespace)
            .ok_or_else(|| AppKitError::NamespaceNotConfigured(namespace.clone()))
    }

    /// Namespaces proposed to WalletConnect wallets.
    pub fn proposal_namespaces(&self) -> NamespaceConfig {
        self.namespace_builder.create_namespaces(&self.caip_networks)
    }

    /// Connect through WalletConnect.
    ///
    /// With SIWX enabled and only EVM networks requested, signs in within
    /// the pairing; otherwise proposes the namespaces and prompts for a
    /// signature afterwards. Returns the first account of every namespace
    /// the wallet approved.
    #[instrument(name = "connect_walletconnect", skip(self))]
    pub async fn connect_walletconnect(&self) -> Result<Vec<CaipAddress>, AppKitError> {
        let namespaces = self.proposal_namespaces();
        let chains: Vec<CaipNetworkId> =
            self.caip_networks.iter().map(CaipNetwork::caip_network_id).collect();
        let methods = namespaces
            .get(&ChainNamespace::Eip155)
            .map(|ns| ns.methods.clone())
            .unwrap_or_default();

        let authenticated = self
            .siwx
            .universal_provider_authenticate(self.provider.as_ref(), &chains, &methods)
            .await?;

        let session = if authenticated {
            self.provider.session().ok_or(ProviderError::NoSession)?
        } else {
            self.provider.connect(&namespaces).await?
        };

        let mut connected = Vec::new();
        for (namespace, manager) in &self.managers {
            let Some(connection) = wallet_connect_connection(
                WALLET_CONNECT_CONNECTOR_ID,
                namespace,
                session.accounts(namespace),
                &self.caip_networks,
            ) else {
                continue;
            };
            let address = connection_address(&connection, namespace, &self.caip_networks);
            manager.upsert_connection(connection);
            self.registry.set_connector_id(WALLET_CONNECT_CONNECTOR_ID, namespace);
            if let Some(address) = address {
                connected.push(address);
            }
        }

        let Some(first) = connected.first().cloned() else {
            return Err(AppKitError::NoAccount(
                self.registry
                    .active_namespace()
                    .unwrap_or(ChainNamespace::Eip155),
            ));
        };

        self.status.mark_connected(WALLET_CONNECT_CONNECTOR_ID);
        self.state
            .set_signer(Signer::WalletConnect(Arc::clone(&self.provider)));
        self.activate(&first);
        appkit_telemetry::log_account_event!(
            info,
            "runtime",
            "WalletConnect session established",
            first,
            siwx = authenticated
        );

        // No-op when the pairing already stored a session.
        self.siwx.initialize_if_enabled(Some(&first)).await;
        Ok(connected)
    }

    /// Connect a registered wallet connector on `namespace`.
    #[instrument(name = "connect_wallet", skip(self))]
    pub async fn connect_wallet(
        &self,
        connector_id: &str,
        namespace: &ChainNamespace,
    ) -> Result<CaipAddress, AppKitError> {
        let manager = self.manager(namespace)?;
        let connector: Connector = self
            .registry
            .get_connector(connector_id, Some(namespace))
            .and_then(|c| c.for_namespace(namespace).cloned())
            .ok_or_else(|| AppKitError::ConnectorNotFound(connector_id.to_string()))?;
        let provider = connector
            .provider
            .clone()
            .ok_or_else(|| ConnectionError::NoProvider(connector.id.clone()))?;

        let network = self
            .state
            .active_caip_network()
            .filter(|n| &n.chain_namespace == namespace)
            .or_else(|| self.state.first_network_of(namespace))
            .ok_or_else(|| AppKitError::NamespaceNotConfigured(namespace.clone()))?;

        let address = provider.connect(Some(&network.id)).await?;
        let mut accounts = provider.get_account_addresses().await.unwrap_or_default();
        if !accounts.iter().any(|a| a.address.eq_ignore_ascii_case(&address)) {
            accounts.insert(0, Account::new(address.clone()));
        }
        let smart_account = accounts
            .iter()
            .find(|a| a.address.eq_ignore_ascii_case(&address))
            .is_some_and(|a| a.account_type == Some(AccountType::SmartAccount));

        manager.upsert_connection(Connection::new(
            connector.id.clone(),
            accounts,
            Some(network.clone()),
        ));
        self.registry.set_connector_id(&connector.id, namespace);
        self.status.mark_connected(&connector.id);
        appkit_telemetry::log_connector_event!(
            info,
            "runtime",
            "Wallet connected",
            namespace,
            connector.id
        );

        let caip_address = CaipAddress::on_network(&network.caip_network_id(), address);
        self.state.set_signer(Signer::Wallet(provider));
        self.state.set_smart_account(smart_account);
        self.state.set_active_network(network);
        self.state.set_active_address(Some(caip_address.clone()));
        self.siwx.initialize_if_enabled(Some(&caip_address)).await;
        Ok(caip_address)
    }

    /// Restore the connections of every namespace.
    ///
    /// Per-namespace failures are logged; the other namespaces still sync.
    #[instrument(name = "sync_connections", skip(self))]
    pub async fn sync_connections(&self) -> BTreeMap<ChainNamespace, SyncReport> {
        let connectors = self.registry.get_connectors();
        let mut reports = BTreeMap::new();

        for (namespace, manager) in &self.managers {
            let registry = Arc::clone(&self.registry);
            let callback_namespace = namespace.clone();
            let params = SyncParams::new(
                connectors.clone(),
                self.caip_networks.clone(),
                Arc::clone(&self.status) as Arc<dyn ConnectionStatusSource>,
            )
            .with_universal_provider(Arc::clone(&self.provider))
            .on_connection(move |connection: &Connection| {
                registry.set_connector_id(&connection.connector_id, &callback_namespace);
            });

            match manager.sync_connections(params).await {
                Ok(report) => {
                    for (connector_id, error) in report.failures() {
                        warn!(error = %error, "[runtime] Probe of {} on {} failed", connector_id, namespace);
                    }
                    reports.insert(namespace.clone(), report);
                }
                Err(e) => warn!(error = %e, "[runtime] Sync of {} failed", namespace),
            }
        }

        self.restore_active_account(&connectors);
        reports
    }

    /// Disconnect the active connector of `namespace`.
    #[instrument(name = "disconnect", skip(self))]
    pub async fn disconnect(&self, namespace: &ChainNamespace) -> Result<(), AppKitError> {
        let manager = self.manager(namespace)?;
        let Some(connector_id) = self.registry.get_connector_id(namespace) else {
            debug!("[runtime] Nothing connected on {}", namespace);
            return Ok(());
        };

        let active = self
            .state
            .active_caip_address()
            .filter(|a| &a.namespace == namespace);

        let result = if connector_id == WALLET_CONNECT_CONNECTOR_ID {
            manager.remove_connection(&connector_id);
            self.provider.disconnect().await.map_err(AppKitError::from)
        } else {
            manager
                .disconnect(&connector_id, &self.registry.get_connectors())
                .await
                .map_err(AppKitError::from)
        };

        self.status.mark_disconnected(&connector_id);
        self.registry.remove_connector_id(namespace);
        if let Some(address) = &active {
            if let Err(e) = self
                .siwx
                .on_disconnect(&address.network_id(), &address.address)
                .await
            {
                warn!(error = %e, "[runtime] Failed to revoke SIWX session");
            }
            self.state.clear_session();
        }
        appkit_telemetry::log_connector_event!(
            info,
            "runtime",
            "Disconnected",
            namespace,
            connector_id
        );
        result
    }

    /// Switch the active network, asking the wallet to follow.
    pub async fn switch_network(&self, caip_network_id: &CaipNetworkId) -> Result<(), AppKitError> {
        let network = self
            .state
            .find_network(caip_network_id)
            .ok_or_else(|| AppKitError::NamespaceNotConfigured(caip_network_id.namespace.clone()))?;
        self.state.switch_network(&network).await?;

        if let Some(address) = self.state.active_caip_address() {
            if address.namespace == network.chain_namespace {
                let moved = CaipAddress::on_network(caip_network_id, address.address);
                self.state.set_active_address(Some(moved.clone()));
                self.siwx.initialize_if_enabled(Some(&moved)).await;
            }
        }
        Ok(())
    }

    /// Make `caip_address` the active account and follow its network.
    pub(crate) fn activate(&self, caip_address: &CaipAddress) {
        if let Some(network) = self.state.find_network(&caip_address.network_id()) {
            self.state.set_active_network(network);
        }
        self.registry
            .set_active_namespace(Some(caip_address.namespace.clone()));
        self.state.set_active_address(Some(caip_address.clone()));
    }

    fn restore_active_account(&self, connectors: &[Connector]) {
        if self.state.is_connected() {
            return;
        }
        let namespace = self
            .registry
            .active_namespace()
            .or_else(|| self.managers.keys().next().cloned());
        let Some(namespace) = namespace else {
            return;
        };
        let Some(manager) = self.managers.get(&namespace) else {
            return;
        };
        let connector_id = self.registry.get_connector_id(&namespace);
        let Some(resolved) = manager.get_connection(connector_id.as_deref(), None, connectors)
        else {
            return;
        };

        let connection = &resolved.connection;
        if let Some(address) = connection_address(connection, &namespace, &self.caip_networks) {
            if connection.connector_id == WALLET_CONNECT_CONNECTOR_ID {
                self.state
                    .set_signer(Signer::WalletConnect(Arc::clone(&self.provider)));
            } else if let Some(provider) = connectors
                .iter()
                .filter_map(|c| c.for_namespace(&namespace))
                .find(|c| c.id == connection.connector_id)
                .and_then(|c| c.provider.clone())
            {
                self.state.set_signer(Signer::Wallet(provider));
            }
            info!("[runtime] Restored {} via {}", address, connection.connector_id);
            self.activate(&address);
        }
    }
}

/// CAIP-10 id of a connection's first account.
fn connection_address(
    connection: &Connection,
    namespace: &ChainNamespace,
    caip_networks: &[CaipNetwork],
) -> Option<CaipAddress> {
    let account = connection.accounts.first()?;
    let network = connection
        .caip_network
        .clone()
        .or_else(|| caip_networks.iter().find(|n| &n.chain_namespace == namespace).cloned())?;
    parse_caip_address(&format!("{}:{}", network.caip_network_id(), account.address)).ok()
}

fn siwx_config(settings: &SiwxSettings) -> Arc<dyn SiwxConfig> {
    let mut config = InMemorySiwxConfig::new(settings.domain.clone(), settings.uri.clone())
        .with_required(settings.required)
        .with_sign_out_on_disconnect(settings.sign_out_on_disconnect);
    if let Some(statement) = &settings.statement {
        config = config.with_statement(statement.clone());
    }
    if let Some(expiration) = settings.expiration() {
        config = config.with_expiration(expiration);
    }
    Arc::new(config)
}
