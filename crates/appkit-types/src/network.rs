//! # Networks
//!
//! The fully-qualified `CaipNetwork` entity, the raw descriptor supplied by
//! the consuming application, and the extension step that attaches project
//! RPC endpoints and image metadata.

use crate::caip::{ChainNamespace, CaipNetworkId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host of the reown-operated RPC proxy.
pub const RPC_PROXY_HOST: &str = "rpc.walletconnect.org";

/// Networks served by the RPC proxy.
pub const PROXY_SUPPORTED_CHAINS: &[&str] = &[
    "eip155:1",
    "eip155:10",
    "eip155:56",
    "eip155:100",
    "eip155:137",
    "eip155:324",
    "eip155:1101",
    "eip155:8453",
    "eip155:42161",
    "eip155:42220",
    "eip155:43114",
    "eip155:59144",
    "eip155:84532",
    "eip155:11155111",
    "eip155:11155420",
    "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
    "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
];

const NETWORK_IMAGE_IDS: &[(&str, &str)] = &[
    ("eip155:1", "ba0ba0cd-17c6-4806-ad93-f9d174f17900"),
    ("eip155:10", "ab9c186a-c52f-464b-2906-ca59d760a400"),
    ("eip155:137", "41d04d42-da3b-4453-8506-668cc0727900"),
    ("eip155:8453", "7289c336-3981-4081-c5f4-efc26ac64a00"),
    ("eip155:42161", "3bff954d-5cb0-47a0-9a23-d20192e74600"),
    ("solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp", "a1b58899-f671-4276-6a5e-56ca5bd59700"),
    ("bip122:000000000019d6689c085ae165831e93", "0b4838db-0161-4ffe-022d-532bf03dba00"),
];

/// Native currency of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

impl NativeCurrency {
    /// Create a currency descriptor.
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// A list of HTTP RPC endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoints {
    /// Endpoint URLs in priority order.
    #[serde(default)]
    pub http: Vec<String>,
}

impl RpcEndpoints {
    /// Endpoint list from URLs.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            http: urls.into_iter().map(Into::into).collect(),
        }
    }
}

/// RPC endpoints of a network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcUrls {
    /// Endpoints used by the SDK.
    pub default: RpcEndpoints,
    /// The chain's own endpoints, never the proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_default: Option<RpcEndpoints>,
}

/// Image metadata for a network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAssets {
    /// Image id on the explorer CDN.
    pub image_id: Option<String>,
    /// Custom image URL.
    pub image_url: Option<String>,
}

/// Network descriptor as supplied by the consuming application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetwork {
    /// Chain reference (`1`, `137`, a Solana genesis hash, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Chain family, EVM when absent.
    #[serde(default)]
    pub chain_namespace: Option<ChainNamespace>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    pub rpc_urls: RpcUrls,
    /// Whether this is a test network.
    #[serde(default)]
    pub testnet: bool,
}

/// Fully-qualified network.
///
/// The CAIP-2 id is derived from `chain_namespace` and `id`, so it always
/// equals `"{chain_namespace}:{id}"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaipNetwork {
    /// Chain reference.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Chain family.
    pub chain_namespace: ChainNamespace,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    pub rpc_urls: RpcUrls,
    /// Image metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<NetworkAssets>,
    /// Legacy CAIP-2 id still expected by some wallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_caip_network_id: Option<CaipNetworkId>,
    /// Whether this is a test network.
    #[serde(default)]
    pub testnet: bool,
}

impl CaipNetwork {
    /// Create a network with a single default RPC endpoint.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        chain_namespace: ChainNamespace,
        native_currency: NativeCurrency,
        rpc_url: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            chain_namespace,
            native_currency,
            rpc_urls: RpcUrls {
                default: RpcEndpoints::new(rpc_url),
                chain_default: None,
            },
            assets: None,
            deprecated_caip_network_id: None,
            testnet: false,
        }
    }

    /// The CAIP-2 id.
    pub fn caip_network_id(&self) -> CaipNetworkId {
        CaipNetworkId::new(self.chain_namespace.clone(), self.id.clone())
    }

    /// First default RPC endpoint.
    pub fn default_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.default.http.first().map(String::as_str)
    }

    /// Attach a legacy CAIP-2 id.
    pub fn with_deprecated_id(mut self, reference: &str) -> Self {
        self.deprecated_caip_network_id =
            Some(CaipNetworkId::new(self.chain_namespace.clone(), reference));
        self
    }

    /// Mark as test network.
    pub fn testnet(mut self) -> Self {
        self.testnet = true;
        self
    }
}

/// A network descriptor tagged at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkDescriptor {
    /// Partially specified by the application.
    Raw(RawNetwork),
    /// Already fully qualified.
    Caip(CaipNetwork),
}

impl NetworkDescriptor {
    /// True for fully-qualified descriptors.
    pub fn is_caip_network(&self) -> bool {
        matches!(self, Self::Caip(_))
    }

    /// Chain family, EVM for raw descriptors without one.
    pub fn chain_namespace(&self) -> ChainNamespace {
        match self {
            Self::Raw(raw) => raw
                .chain_namespace
                .clone()
                .unwrap_or(ChainNamespace::Eip155),
            Self::Caip(network) => network.chain_namespace.clone(),
        }
    }

    /// CAIP-2 id, synthesized for raw descriptors.
    pub fn caip_network_id(&self) -> CaipNetworkId {
        match self {
            Self::Raw(raw) => CaipNetworkId::new(self.chain_namespace(), raw.id.clone()),
            Self::Caip(network) => network.caip_network_id(),
        }
    }

    fn rpc_urls(&self) -> &RpcUrls {
        match self {
            Self::Raw(raw) => &raw.rpc_urls,
            Self::Caip(network) => &network.rpc_urls,
        }
    }
}

impl From<RawNetwork> for NetworkDescriptor {
    fn from(raw: RawNetwork) -> Self {
        Self::Raw(raw)
    }
}

impl From<CaipNetwork> for NetworkDescriptor {
    fn from(network: CaipNetwork) -> Self {
        Self::Caip(network)
    }
}

/// Project-level settings applied when extending networks.
#[derive(Clone, Debug, Default)]
pub struct ExtendOptions {
    /// Cloud project id; the RPC proxy is only used when non-empty.
    pub project_id: String,
    /// Extra RPC URLs per network, placed ahead of everything else.
    pub custom_rpc_urls: HashMap<CaipNetworkId, Vec<String>>,
    /// Custom image URL per chain reference.
    pub custom_network_image_urls: HashMap<String, String>,
}

/// Proxy URL for a network.
pub fn blockchain_api_rpc_url(caip_network_id: &CaipNetworkId, project_id: &str) -> String {
    format!("https://{RPC_PROXY_HOST}/v1/?chainId={caip_network_id}&projectId={project_id}")
}

/// Whether the RPC proxy serves this network.
pub fn is_proxy_supported(caip_network_id: &CaipNetworkId) -> bool {
    let id = caip_network_id.to_string();
    PROXY_SUPPORTED_CHAINS.contains(&id.as_str())
}

fn is_proxy_url(url: &str) -> bool {
    url.contains(RPC_PROXY_HOST)
}

fn push_unique(list: &mut Vec<String>, url: &str) {
    if !list.iter().any(|u| u == url) {
        list.push(url.to_string());
    }
}

/// Extend a descriptor with project RPC endpoints and image metadata.
///
/// Idempotent: extending the result again yields the same network.
pub fn extend_caip_network(descriptor: &NetworkDescriptor, options: &ExtendOptions) -> CaipNetwork {
    let caip_network_id = descriptor.caip_network_id();
    let custom = options
        .custom_rpc_urls
        .get(&caip_network_id)
        .cloned()
        .unwrap_or_default();

    // The network's own endpoint, skipping anything a previous pass added.
    let rpc_urls = descriptor.rpc_urls();
    let origin = rpc_urls
        .chain_default
        .iter()
        .flat_map(|e| e.http.iter())
        .chain(rpc_urls.default.http.iter())
        .find(|url| !is_proxy_url(url) && !custom.contains(url))
        .cloned();

    let use_proxy = !options.project_id.is_empty() && is_proxy_supported(&caip_network_id);

    let mut default = Vec::new();
    let mut chain_default = Vec::new();
    for url in &custom {
        push_unique(&mut default, url);
        push_unique(&mut chain_default, url);
    }
    if use_proxy {
        push_unique(
            &mut default,
            &blockchain_api_rpc_url(&caip_network_id, &options.project_id),
        );
    } else if let Some(url) = &origin {
        push_unique(&mut default, url);
    }
    if let Some(url) = &origin {
        push_unique(&mut chain_default, url);
    }

    let image_id = NETWORK_IMAGE_IDS
        .iter()
        .find(|(id, _)| *id == caip_network_id.to_string())
        .map(|(_, image)| image.to_string());

    let (id, name, native_currency, testnet, deprecated, previous_assets) = match descriptor {
        NetworkDescriptor::Raw(raw) => (
            raw.id.clone(),
            raw.name.clone(),
            raw.native_currency.clone(),
            raw.testnet,
            None,
            None,
        ),
        NetworkDescriptor::Caip(network) => (
            network.id.clone(),
            network.name.clone(),
            network.native_currency.clone(),
            network.testnet,
            network.deprecated_caip_network_id.clone(),
            network.assets.clone(),
        ),
    };

    let image_url = options
        .custom_network_image_urls
        .get(&id)
        .cloned()
        .or_else(|| previous_assets.and_then(|a| a.image_url));

    CaipNetwork {
        id,
        name,
        chain_namespace: descriptor.chain_namespace(),
        native_currency,
        rpc_urls: RpcUrls {
            default: RpcEndpoints { http: default },
            chain_default: Some(RpcEndpoints {
                http: chain_default,
            }),
        },
        assets: Some(NetworkAssets {
            image_id,
            image_url,
        }),
        deprecated_caip_network_id: deprecated,
        testnet,
    }
}

/// Extend every descriptor.
pub fn extend_caip_networks(
    descriptors: &[NetworkDescriptor],
    options: &ExtendOptions,
) -> Vec<CaipNetwork> {
    descriptors
        .iter()
        .map(|d| extend_caip_network(d, options))
        .collect()
}
