//! # Domain Entities
//!
//! Connectors, accounts and connections shared by every subsystem.

use crate::capabilities::WalletProvider;
use crate::caip::ChainNamespace;
use crate::network::CaipNetwork;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

// =============================================================================
// WELL-KNOWN CONNECTOR IDS
// =============================================================================

/// The WalletConnect connector.
pub const WALLET_CONNECT_CONNECTOR_ID: &str = "walletConnect";
/// The email/social auth connector.
pub const AUTH_CONNECTOR_ID: &str = "ID_AUTH";
/// Generic injected provider.
pub const INJECTED_CONNECTOR_ID: &str = "injected";
/// Coinbase Wallet.
pub const COINBASE_CONNECTOR_ID: &str = "coinbaseWallet";
/// Coinbase Wallet SDK.
pub const COINBASE_SDK_CONNECTOR_ID: &str = "coinbaseWalletSDK";
/// Base Account.
pub const BASE_ACCOUNT_CONNECTOR_ID: &str = "baseAccount";

/// Case-insensitive string equality.
pub fn is_lower_case_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
    /// Externally-owned account.
    Eoa,
    /// Smart contract account.
    SmartAccount,
    /// Bitcoin payment address.
    Payment,
    /// Bitcoin ordinals address.
    Ordinal,
    /// Stacks address.
    Stx,
}

/// A wallet account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Plain address.
    pub address: String,
    /// Role of the account.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    /// Public key, when the wallet exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Derivation path, when the wallet exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Account {
    /// Account with only an address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            account_type: None,
            public_key: None,
            path: None,
        }
    }

    /// Set the role.
    pub fn with_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    /// Set the public key.
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }
}

/// A live connection between a connector and a network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connector that owns the connection.
    pub connector_id: String,
    /// Accounts, unique by case-insensitive address.
    pub accounts: Vec<Account>,
    /// Active network, if known.
    pub caip_network: Option<CaipNetwork>,
}

impl Connection {
    /// Build a connection, dropping duplicate addresses (first one wins).
    pub fn new(
        connector_id: impl Into<String>,
        accounts: Vec<Account>,
        caip_network: Option<CaipNetwork>,
    ) -> Self {
        let mut seen = HashSet::new();
        let accounts = accounts
            .into_iter()
            .filter(|a| seen.insert(a.address.to_lowercase()))
            .collect();

        Self {
            connector_id: connector_id.into(),
            accounts,
            caip_network,
        }
    }

    /// Whether an address belongs to this connection.
    #[must_use]
    pub fn has_address(&self, address: &str) -> bool {
        self.accounts
            .iter()
            .any(|a| is_lower_case_match(&a.address, address))
    }
}

// =============================================================================
// CONNECTORS
// =============================================================================

/// Connector kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorType {
    /// EIP-6963 announced wallet.
    Announced,
    /// Injected provider.
    Injected,
    /// WalletConnect.
    WalletConnect,
    /// Email/social auth.
    Auth,
    /// Vendor SDK.
    External,
    /// Recommended by the explorer.
    Recommended,
    /// Featured by the explorer.
    Featured,
    /// Aggregate of per-namespace connectors.
    MultiChain,
}

/// EIP-6963 provider info.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    /// Reverse-DNS identifier.
    pub rdns: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Icon URL or data URI.
    pub icon: Option<String>,
}

/// Wallet entry from the explorer catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerWallet {
    /// Explorer id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Reverse-DNS identifier.
    #[serde(default)]
    pub rdns: Option<String>,
    /// Image id on the explorer CDN.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Display order, ascending.
    #[serde(default)]
    pub order: Option<u32>,
}

/// Shared handle to a wallet provider.
#[derive(Clone)]
pub struct ProviderHandle(pub Arc<dyn WalletProvider>);

impl ProviderHandle {
    /// Wrap a provider.
    pub fn new<P: WalletProvider + 'static>(provider: P) -> Self {
        Self(Arc::new(provider))
    }
}

impl Deref for ProviderHandle {
    type Target = dyn WalletProvider;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderHandle(..)")
    }
}

impl From<Arc<dyn WalletProvider>> for ProviderHandle {
    fn from(provider: Arc<dyn WalletProvider>) -> Self {
        Self(provider)
    }
}

/// A way of connecting a wallet on one chain namespace.
///
/// Multi-chain connectors aggregate their per-namespace members in
/// `connectors`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    /// Connector id; not unique across namespaces.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Kind.
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    /// Namespace the connector serves.
    pub chain: ChainNamespace,
    /// Explorer id, once matched.
    #[serde(default)]
    pub explorer_id: Option<String>,
    /// Image id on the explorer CDN.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Explicit image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// EIP-6963 info.
    #[serde(default)]
    pub info: Option<ConnectorInfo>,
    /// Explorer catalog entry, once matched.
    #[serde(default)]
    pub explorer_wallet: Option<ExplorerWallet>,
    /// Per-namespace members of a multi-chain connector.
    #[serde(default)]
    pub connectors: Vec<Connector>,
    /// Underlying wallet provider.
    #[serde(skip)]
    pub provider: Option<ProviderHandle>,
}

impl Connector {
    /// Create a connector.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        connector_type: ConnectorType,
        chain: ChainNamespace,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            connector_type,
            chain,
            explorer_id: None,
            image_id: None,
            image_url: None,
            info: None,
            explorer_wallet: None,
            connectors: Vec::new(),
            provider: None,
        }
    }

    /// Attach EIP-6963 info.
    pub fn with_info(mut self, info: ConnectorInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Attach a reverse-DNS id.
    pub fn with_rdns(mut self, rdns: impl Into<String>) -> Self {
        let mut info = self.info.take().unwrap_or_default();
        info.rdns = Some(rdns.into());
        self.info = Some(info);
        self
    }

    /// Attach an explicit image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Attach a provider.
    pub fn with_provider(mut self, provider: ProviderHandle) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Reverse-DNS id, if any.
    #[must_use]
    pub fn rdns(&self) -> Option<&str> {
        self.info.as_ref().and_then(|i| i.rdns.as_deref())
    }

    /// True for connectors that aggregate several namespaces.
    #[must_use]
    pub fn is_multi_chain(&self) -> bool {
        self.connector_type == ConnectorType::MultiChain
    }

    /// Namespaces this connector can serve, including members.
    pub fn namespaces(&self) -> Vec<ChainNamespace> {
        let mut namespaces = vec![self.chain.clone()];
        for member in &self.connectors {
            if !namespaces.contains(&member.chain) {
                namespaces.push(member.chain.clone());
            }
        }
        namespaces
    }

    /// The member serving `namespace`, or self when it matches.
    pub fn for_namespace(&self, namespace: &ChainNamespace) -> Option<&Connector> {
        if &self.chain == namespace && self.connectors.is_empty() {
            return Some(self);
        }
        self.connectors
            .iter()
            .find(|c| &c.chain == namespace)
            .or_else(|| (&self.chain == namespace).then_some(self))
    }
}

impl PartialEq for Connector {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.connector_type == other.connector_type
            && self.chain == other.chain
            && self.explorer_id == other.explorer_id
            && self.image_id == other.image_id
            && self.image_url == other.image_url
            && self.info == other.info
            && self.explorer_wallet == other.explorer_wallet
            && self.connectors == other.connectors
    }
}
