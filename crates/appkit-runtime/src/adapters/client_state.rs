//! # Client State
//!
//! Active account, network and modal state of the client, and the SIWX
//! host port implemented over it.

use ak_05_siwx::SiwxHost;
use appkit_bus::{AppKitEvent, EventPublisher, InMemoryEventBus};
use appkit_types::{
    CaipAddress, CaipNetwork, CaipNetworkId, ChainNamespace, ProviderError, ProviderHandle,
    UniversalProvider,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Transport that signs for the active account.
#[derive(Clone)]
pub enum Signer {
    /// WalletConnect session.
    WalletConnect(Arc<dyn UniversalProvider>),
    /// Injected or announced wallet.
    Wallet(ProviderHandle),
}

impl Signer {
    async fn disconnect(&self) -> Result<(), ProviderError> {
        match self {
            Self::WalletConnect(provider) => provider.disconnect().await,
            Self::Wallet(handle) => handle.disconnect().await,
        }
    }
}

/// Screen the modal shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModalView {
    /// Modal hidden.
    #[default]
    Closed,
    /// Wallet list.
    Connect,
    /// SIWX sign-message prompt.
    SiwxSignMessage,
}

/// Shared client state.
pub struct ClientState {
    networks: Vec<CaipNetwork>,
    active_address: RwLock<Option<CaipAddress>>,
    active_network: RwLock<Option<CaipNetwork>>,
    last_authenticated: RwLock<Option<CaipNetworkId>>,
    signer: RwLock<Option<Signer>>,
    view: RwLock<ModalView>,
    pairing_uri: RwLock<Option<String>>,
    smart_account: AtomicBool,
    event_bus: Arc<InMemoryEventBus>,
}

impl ClientState {
    /// State over the requested `networks`; the first one is active.
    pub fn new(networks: Vec<CaipNetwork>, event_bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            active_network: RwLock::new(networks.first().cloned()),
            networks,
            active_address: RwLock::new(None),
            last_authenticated: RwLock::new(None),
            signer: RwLock::new(None),
            view: RwLock::new(ModalView::Closed),
            pairing_uri: RwLock::new(None),
            smart_account: AtomicBool::new(false),
            event_bus,
        }
    }

    /// Requested network by id.
    pub fn find_network(&self, caip_network_id: &CaipNetworkId) -> Option<CaipNetwork> {
        self.networks
            .iter()
            .find(|n| &n.caip_network_id() == caip_network_id)
            .cloned()
    }

    /// First requested network of `namespace`.
    pub fn first_network_of(&self, namespace: &ChainNamespace) -> Option<CaipNetwork> {
        self.networks
            .iter()
            .find(|n| &n.chain_namespace == namespace)
            .cloned()
    }

    /// Set or clear the active account.
    pub fn set_active_address(&self, caip_address: Option<CaipAddress>) {
        let previous = {
            let mut active = self.active_address.write();
            if *active == caip_address {
                return;
            }
            std::mem::replace(&mut *active, caip_address.clone())
        };

        let namespace = caip_address
            .as_ref()
            .or(previous.as_ref())
            .map(|a| a.namespace.clone());
        if let Some(namespace) = namespace {
            debug!("[runtime] Active account of {} is now {:?}", namespace, caip_address);
            self.event_bus.emit(AppKitEvent::AccountChanged {
                namespace,
                caip_address: caip_address.map(|a| a.to_string()),
            });
        }
    }

    /// Set the active network.
    pub fn set_active_network(&self, network: CaipNetwork) {
        let caip_network_id = network.caip_network_id();
        let changed = {
            let mut active = self.active_network.write();
            let changed = active.as_ref().map(CaipNetwork::caip_network_id) != Some(caip_network_id.clone());
            *active = Some(network);
            changed
        };
        if changed {
            self.event_bus.emit(AppKitEvent::NetworkChanged { caip_network_id });
        }
    }

    /// Install the signer of the active account.
    pub fn set_signer(&self, signer: Signer) {
        *self.signer.write() = Some(signer);
    }

    /// Forget the signer and the active account.
    pub fn clear_session(&self) {
        self.signer.write().take();
        self.smart_account.store(false, Ordering::SeqCst);
        self.set_active_address(None);
    }

    /// Whether an account is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active_address.read().is_some()
    }

    /// Current modal screen.
    #[must_use]
    pub fn view(&self) -> ModalView {
        *self.view.read()
    }

    /// Last WalletConnect pairing URI.
    pub fn pairing_uri(&self) -> Option<String> {
        self.pairing_uri.read().clone()
    }

    /// Record a pairing URI.
    pub fn set_pairing_uri(&self, uri: &str) {
        *self.pairing_uri.write() = Some(uri.to_string());
    }

    /// Mark the active account as a smart account.
    pub fn set_smart_account(&self, smart_account: bool) {
        self.smart_account.store(smart_account, Ordering::SeqCst);
    }

    fn signer(&self) -> Result<Signer, ProviderError> {
        self.signer.read().clone().ok_or(ProviderError::NoSession)
    }
}

#[async_trait]
impl SiwxHost for ClientState {
    fn active_caip_address(&self) -> Option<CaipAddress> {
        self.active_address.read().clone()
    }

    fn active_caip_network(&self) -> Option<CaipNetwork> {
        self.active_network.read().clone()
    }

    fn requested_networks(&self) -> Vec<CaipNetwork> {
        self.networks.clone()
    }

    fn is_smart_account(&self) -> bool {
        self.smart_account.load(Ordering::SeqCst)
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        match self.signer()? {
            Signer::Wallet(handle) => handle.sign_message(message).await,
            Signer::WalletConnect(provider) => {
                let address = self
                    .active_caip_address()
                    .ok_or(ProviderError::NoSession)?;
                let chain_id = address.network_id().to_string();
                let response = provider
                    .request("personal_sign", json!([message, address.address]), Some(&chain_id))
                    .await?;
                match response {
                    Value::String(signature) => Ok(signature),
                    other => Err(ProviderError::Request(format!(
                        "Unexpected personal_sign response: {other}"
                    ))),
                }
            }
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        let signer = self.signer.write().take();
        self.set_active_address(None);
        match signer {
            Some(signer) => signer.disconnect().await,
            None => Ok(()),
        }
    }

    async fn switch_network(&self, network: &CaipNetwork) -> Result<(), ProviderError> {
        if let (Ok(Signer::Wallet(handle)), ChainNamespace::Eip155) =
            (self.signer(), &network.chain_namespace)
        {
            let chain_id = network
                .id
                .parse::<u64>()
                .map(|id| format!("0x{id:x}"))
                .unwrap_or_else(|_| network.id.clone());
            match handle
                .request("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
                .await
            {
                Ok(_) => {}
                Err(ProviderError::Unsupported(_)) => {
                    debug!("[runtime] Wallet cannot switch chains, switching locally");
                }
                Err(e) => return Err(e),
            }
        }
        self.set_active_network(network.clone());
        Ok(())
    }

    fn open_prompt(&self) {
        *self.view.write() = ModalView::SiwxSignMessage;
    }

    fn close_prompt(&self) {
        *self.view.write() = ModalView::Closed;
    }

    fn is_prompt_open(&self) -> bool {
        self.view() == ModalView::SiwxSignMessage
    }

    fn reset_to_connect(&self) {
        *self.view.write() = ModalView::Connect;
    }

    fn last_authenticated_network(&self) -> Option<CaipNetworkId> {
        self.last_authenticated.read().clone()
    }

    fn set_last_authenticated_network(&self, network: CaipNetworkId) {
        *self.last_authenticated.write() = Some(network);
    }
}
