//! # Capability Ports
//!
//! Interfaces of the collaborators this core drives but does not implement:
//! chain-specific wallet providers and the WalletConnect universal provider.

use crate::caip::ChainNamespace;
use crate::entities::Account;
use crate::errors::ProviderError;
use crate::network::CaipNetwork;
use crate::walletconnect::{
    AuthenticateParams, AuthenticateResult, Cacao, ChainIdValue, NamespaceConfig, Session,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Live state read from an injected EVM provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderData {
    /// Authorized accounts.
    pub accounts: Vec<String>,
    /// Decimal chain reference, if the provider reported one.
    pub chain_id: Option<String>,
}

/// Parse an `eth_chainId` result: hex string, decimal string or number.
pub fn parse_chain_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok().map(|n| n.to_string()),
            None => s.parse::<u64>().ok().map(|n| n.to_string()),
        },
        _ => None,
    }
}

/// A chain-specific wallet provider behind a connector.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect, optionally on a given chain reference. Returns the address.
    async fn connect(&self, chain_id: Option<&str>) -> Result<String, ProviderError>;

    /// Disconnect.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Purposed addresses (Bitcoin payment/ordinal).
    async fn get_account_addresses(&self) -> Result<Vec<Account>, ProviderError> {
        Ok(Vec::new())
    }

    /// Sign a plain-text message.
    async fn sign_message(&self, message: &str) -> Result<String, ProviderError>;

    /// Raw RPC request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Networks the provider supports.
    fn chains(&self) -> Vec<CaipNetwork> {
        Vec::new()
    }

    /// Read accounts and chain id concurrently.
    ///
    /// Failures are logged and reported as empty data.
    async fn fetch_provider_data(&self) -> ProviderData {
        let (accounts, chain_id) = futures::join!(
            self.request("eth_accounts", json!([])),
            self.request("eth_chainId", json!([]))
        );

        match (accounts, chain_id) {
            (Ok(accounts), Ok(chain_id)) => ProviderData {
                accounts: serde_json::from_value(accounts).unwrap_or_default(),
                chain_id: parse_chain_id(&chain_id),
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch provider data");
                ProviderData::default()
            }
        }
    }
}

// =============================================================================
// UNIVERSAL PROVIDER
// =============================================================================

/// Lifecycle events emitted by a universal provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A session was established.
    Connect,
    /// The session ended.
    Disconnect,
    /// Bare addresses of the new account set.
    AccountsChanged(Vec<String>),
    /// New active chain.
    ChainChanged(ChainIdValue),
    /// Pairing URI to display as a QR code.
    DisplayUri(String),
}

/// Discriminant of [`ProviderEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    /// `connect`
    Connect,
    /// `disconnect`
    Disconnect,
    /// `accountsChanged`
    AccountsChanged,
    /// `chainChanged`
    ChainChanged,
    /// `display_uri`
    DisplayUri,
}

impl ProviderEventKind {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
            Self::DisplayUri => "display_uri",
        }
    }
}

impl ProviderEvent {
    /// The event's kind.
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            Self::Connect => ProviderEventKind::Connect,
            Self::Disconnect => ProviderEventKind::Disconnect,
            Self::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            Self::ChainChanged(_) => ProviderEventKind::ChainChanged,
            Self::DisplayUri(_) => ProviderEventKind::DisplayUri,
        }
    }
}

/// Identifies one registered provider listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Listener callback.
pub type EventHandler = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

/// The WalletConnect client-side transport.
#[async_trait]
pub trait UniversalProvider: Send + Sync {
    /// The established session, if any.
    fn session(&self) -> Option<Session>;

    /// Active default chain reference for a namespace.
    fn default_chain(&self, namespace: &ChainNamespace) -> Option<String>;

    /// Register a listener for one event kind.
    fn on(&self, kind: ProviderEventKind, handler: EventHandler) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Propose a session.
    async fn connect(&self, namespaces: &NamespaceConfig) -> Result<Session, ProviderError>;

    /// One-click authentication.
    async fn authenticate(
        &self,
        params: &AuthenticateParams,
    ) -> Result<AuthenticateResult, ProviderError>;

    /// RPC request routed to a chain.
    async fn request(
        &self,
        method: &str,
        params: Value,
        chain_id: Option<&str>,
    ) -> Result<Value, ProviderError>;

    /// End the session.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Render the message a CACAO was signed over.
    fn format_auth_message(&self, cacao: &Cacao) -> String {
        cacao.format_message()
    }
}
