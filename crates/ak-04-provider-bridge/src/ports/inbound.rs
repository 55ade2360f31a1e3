//! # Inbound Ports
//!
//! Callback set and API trait of the Provider Event Bridge.

use appkit_types::{CaipAddress, ChainIdValue, ChainNamespace, UniversalProvider};
use std::sync::Arc;

/// Receives resolved CAIP-10 accounts.
pub type AccountsCallback = Arc<dyn Fn(Vec<CaipAddress>) + Send + Sync>;
/// Receives the new chain id.
pub type ChainCallback = Arc<dyn Fn(ChainIdValue) + Send + Sync>;
/// Receives the pairing URI.
pub type UriCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Receives nothing.
pub type UnitCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks for one [`listen`](ProviderEventBridgeApi::listen) call.
///
/// Only supplied callbacks get a provider listener.
#[derive(Clone)]
pub struct ListenParams {
    /// Namespace whose accounts are reported.
    pub namespace: ChainNamespace,
    /// Session established.
    pub on_connect: Option<AccountsCallback>,
    /// Session ended.
    pub on_disconnect: Option<UnitCallback>,
    /// Account set changed.
    pub on_accounts_changed: Option<AccountsCallback>,
    /// Active chain changed.
    pub on_chain_changed: Option<ChainCallback>,
    /// Pairing URI available.
    pub on_display_uri: Option<UriCallback>,
}

impl ListenParams {
    /// No callbacks for `namespace`.
    pub fn new(namespace: ChainNamespace) -> Self {
        Self {
            namespace,
            on_connect: None,
            on_disconnect: None,
            on_accounts_changed: None,
            on_chain_changed: None,
            on_display_uri: None,
        }
    }

    /// Set the connect callback.
    #[must_use]
    pub fn on_connect<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<CaipAddress>) + Send + Sync + 'static,
    {
        self.on_connect = Some(Arc::new(f));
        self
    }

    /// Set the disconnect callback.
    #[must_use]
    pub fn on_disconnect<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_disconnect = Some(Arc::new(f));
        self
    }

    /// Set the accounts-changed callback.
    #[must_use]
    pub fn on_accounts_changed<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<CaipAddress>) + Send + Sync + 'static,
    {
        self.on_accounts_changed = Some(Arc::new(f));
        self
    }

    /// Set the chain-changed callback.
    #[must_use]
    pub fn on_chain_changed<F>(mut self, f: F) -> Self
    where
        F: Fn(ChainIdValue) + Send + Sync + 'static,
    {
        self.on_chain_changed = Some(Arc::new(f));
        self
    }

    /// Set the display-uri callback.
    #[must_use]
    pub fn on_display_uri<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_display_uri = Some(Arc::new(f));
        self
    }
}

/// Provider Event Bridge API - inbound port.
pub trait ProviderEventBridgeApi: Send + Sync {
    /// Subscription returned by `listen`.
    type Subscription;

    /// Register listeners for the supplied callbacks.
    fn listen(&self, params: ListenParams) -> Self::Subscription;

    /// The provider being bridged.
    fn provider(&self) -> &Arc<dyn UniversalProvider>;
}
