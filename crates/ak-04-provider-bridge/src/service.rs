//! Provider Event Bridge Service
//!
//! Translates universal provider events into namespace-scoped callbacks.
//! Listeners are registered per `listen` call and removed when the
//! returned [`ProviderSubscription`] is dropped.

use crate::ports::inbound::{ListenParams, ProviderEventBridgeApi};
use appkit_bus::{AppKitEvent, EventPublisher, InMemoryEventBus};
use appkit_types::{
    is_lower_case_match, parse_caip_address, CaipAddress, ChainNamespace, EventHandler,
    ListenerId, ProviderEvent, ProviderEventKind, UniversalProvider,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// CAIP-10 accounts of the provider's session for `namespace`.
pub fn get_wallet_connect_accounts(
    provider: &dyn UniversalProvider,
    namespace: &ChainNamespace,
) -> Vec<CaipAddress> {
    let Some(session) = provider.session() else {
        return Vec::new();
    };

    let mut accounts: Vec<CaipAddress> = Vec::new();
    for account in session.accounts(namespace) {
        match parse_caip_address(account) {
            Ok(parsed) => {
                if !accounts.contains(&parsed) {
                    accounts.push(parsed);
                }
            }
            Err(e) => warn!(error = %e, "[ak-04] Skipping malformed session account"),
        }
    }
    accounts
}

/// Resolve bare addresses against the session accounts on the default
/// chain of `namespace`. Unmatched addresses are dropped.
pub fn resolve_changed_accounts(
    provider: &dyn UniversalProvider,
    namespace: &ChainNamespace,
    addresses: &[String],
) -> Vec<CaipAddress> {
    let Some(default_chain) = provider.default_chain(namespace) else {
        warn!(namespace = %namespace, "[ak-04] No default chain, ignoring accountsChanged");
        return Vec::new();
    };
    let session_accounts = provider
        .session()
        .map(|s| s.accounts(namespace).to_vec())
        .unwrap_or_default();

    addresses
        .iter()
        .filter_map(|address| {
            let expected = format!("{namespace}:{default_chain}:{address}");
            let resolved = session_accounts
                .iter()
                .find(|a| is_lower_case_match(a, &expected))
                .and_then(|a| parse_caip_address(a).ok());
            if resolved.is_none() {
                warn!(address = %address, "[ak-04] Address not found in session");
            }
            resolved
        })
        .collect()
}

/// Listeners registered by one `listen` call.
#[must_use = "dropping the subscription removes its listeners"]
pub struct ProviderSubscription {
    provider: Arc<dyn UniversalProvider>,
    listeners: Vec<ListenerId>,
}

impl ProviderSubscription {
    /// Number of provider listeners held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when no callback was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove the listeners now.
    pub fn unsubscribe(mut self) {
        self.remove_all();
    }

    fn remove_all(&mut self) {
        for id in self.listeners.drain(..) {
            self.provider.remove_listener(id);
        }
    }
}

impl Drop for ProviderSubscription {
    fn drop(&mut self) {
        self.remove_all();
    }
}

/// Provider Event Bridge implementation
pub struct ProviderEventBridge {
    provider: Arc<dyn UniversalProvider>,
    event_bus: Option<Arc<InMemoryEventBus>>,
}

impl ProviderEventBridge {
    /// Bridge `provider`.
    pub fn new(provider: Arc<dyn UniversalProvider>) -> Self {
        Self {
            provider,
            event_bus: None,
        }
    }

    /// Also publish pairing URIs on `bus`.
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<InMemoryEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    fn register(&self, kind: ProviderEventKind, handler: EventHandler) -> ListenerId {
        debug!("[ak-04] Listening to {}", kind.as_str());
        self.provider.on(kind, handler)
    }
}

impl ProviderEventBridgeApi for ProviderEventBridge {
    type Subscription = ProviderSubscription;

    fn listen(&self, params: ListenParams) -> ProviderSubscription {
        let mut listeners = Vec::new();
        let namespace = params.namespace;
        let weak = Arc::downgrade(&self.provider);

        if let Some(callback) = params.on_connect {
            let weak = weak.clone();
            let namespace = namespace.clone();
            listeners.push(self.register(
                ProviderEventKind::Connect,
                Arc::new(move |_| {
                    if let Some(provider) = weak.upgrade() {
                        callback(get_wallet_connect_accounts(provider.as_ref(), &namespace));
                    }
                }),
            ));
        }

        if let Some(callback) = params.on_disconnect {
            listeners.push(self.register(
                ProviderEventKind::Disconnect,
                Arc::new(move |_| callback()),
            ));
        }

        if let Some(callback) = params.on_accounts_changed {
            let weak = weak.clone();
            let namespace = namespace.clone();
            listeners.push(self.register(
                ProviderEventKind::AccountsChanged,
                Arc::new(move |event| {
                    let (ProviderEvent::AccountsChanged(addresses), Some(provider)) =
                        (event, weak.upgrade())
                    else {
                        return;
                    };
                    let resolved =
                        resolve_changed_accounts(provider.as_ref(), &namespace, addresses);
                    if !resolved.is_empty() {
                        callback(resolved);
                    }
                }),
            ));
        }

        if let Some(callback) = params.on_chain_changed {
            listeners.push(self.register(
                ProviderEventKind::ChainChanged,
                Arc::new(move |event| {
                    if let ProviderEvent::ChainChanged(chain_id) = event {
                        callback(chain_id.clone());
                    }
                }),
            ));
        }

        if let Some(callback) = params.on_display_uri {
            let bus = self.event_bus.clone();
            listeners.push(self.register(
                ProviderEventKind::DisplayUri,
                Arc::new(move |event| {
                    if let ProviderEvent::DisplayUri(uri) = event {
                        if let Some(bus) = &bus {
                            bus.emit(AppKitEvent::PairingUri { uri: uri.clone() });
                        }
                        callback(uri);
                    }
                }),
            ));
        }

        ProviderSubscription {
            provider: Arc::clone(&self.provider),
            listeners,
        }
    }

    fn provider(&self) -> &Arc<dyn UniversalProvider> {
        &self.provider
    }
}
