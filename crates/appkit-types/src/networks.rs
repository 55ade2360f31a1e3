//! Well-known network definitions.

use crate::caip::{CaipNetworkId, ChainNamespace};
use crate::network::{CaipNetwork, NativeCurrency};

/// Solana mainnet genesis reference.
pub const SOLANA_MAINNET_REF: &str = "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";
/// Legacy Solana mainnet reference.
pub const SOLANA_MAINNET_DEPRECATED_REF: &str = "4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ";
/// Solana devnet genesis reference.
pub const SOLANA_DEVNET_REF: &str = "EtWTRABZaYq6iMfeYKouRu166VU2xqa1";
/// Legacy Solana devnet reference.
pub const SOLANA_DEVNET_DEPRECATED_REF: &str = "8E9rvCKLFQia2Y35HXjjpWzj8weVo44K";
/// Bitcoin mainnet genesis reference.
pub const BITCOIN_MAINNET_REF: &str = "000000000019d6689c085ae165831e93";
/// Polkadot relay chain genesis reference.
pub const POLKADOT_MAINNET_REF: &str = "91b171bb158e2d3848fa23a9f1c25182";

fn ether() -> NativeCurrency {
    NativeCurrency::new("Ether", "ETH", 18)
}

/// Ethereum mainnet.
pub fn mainnet() -> CaipNetwork {
    CaipNetwork::new("1", "Ethereum", ChainNamespace::Eip155, ether(), Some("https://eth.merkle.io"))
}

/// Polygon PoS.
pub fn polygon() -> CaipNetwork {
    CaipNetwork::new(
        "137",
        "Polygon",
        ChainNamespace::Eip155,
        NativeCurrency::new("POL", "POL", 18),
        Some("https://polygon-rpc.com"),
    )
}

/// Arbitrum One.
pub fn arbitrum() -> CaipNetwork {
    CaipNetwork::new("42161", "Arbitrum One", ChainNamespace::Eip155, ether(), Some("https://arb1.arbitrum.io/rpc"))
}

/// OP Mainnet.
pub fn optimism() -> CaipNetwork {
    CaipNetwork::new("10", "OP Mainnet", ChainNamespace::Eip155, ether(), Some("https://mainnet.optimism.io"))
}

/// Base.
pub fn base() -> CaipNetwork {
    CaipNetwork::new("8453", "Base", ChainNamespace::Eip155, ether(), Some("https://mainnet.base.org"))
}

/// Solana mainnet.
pub fn solana() -> CaipNetwork {
    CaipNetwork::new(
        SOLANA_MAINNET_REF,
        "Solana",
        ChainNamespace::Solana,
        NativeCurrency::new("Solana", "SOL", 9),
        Some("https://api.mainnet-beta.solana.com"),
    )
    .with_deprecated_id(SOLANA_MAINNET_DEPRECATED_REF)
}

/// Solana devnet.
pub fn solana_devnet() -> CaipNetwork {
    CaipNetwork::new(
        SOLANA_DEVNET_REF,
        "Solana Devnet",
        ChainNamespace::Solana,
        NativeCurrency::new("Solana", "SOL", 9),
        Some("https://api.devnet.solana.com"),
    )
    .with_deprecated_id(SOLANA_DEVNET_DEPRECATED_REF)
    .testnet()
}

/// Bitcoin mainnet.
pub fn bitcoin() -> CaipNetwork {
    CaipNetwork::new(
        BITCOIN_MAINNET_REF,
        "Bitcoin",
        ChainNamespace::Bip122,
        NativeCurrency::new("Bitcoin", "BTC", 8),
        None,
    )
}

/// Polkadot relay chain.
pub fn polkadot() -> CaipNetwork {
    CaipNetwork::new(
        POLKADOT_MAINNET_REF,
        "Polkadot",
        ChainNamespace::Polkadot,
        NativeCurrency::new("Polkadot", "DOT", 10),
        Some("wss://rpc.polkadot.io"),
    )
}

/// Every well-known network.
pub fn all() -> Vec<CaipNetwork> {
    vec![
        mainnet(),
        polygon(),
        arbitrum(),
        optimism(),
        base(),
        solana(),
        solana_devnet(),
        bitcoin(),
        polkadot(),
    ]
}

/// Well-known network by CAIP-2 id. Legacy Solana ids match too.
pub fn find(caip_network_id: &CaipNetworkId) -> Option<CaipNetwork> {
    all().into_iter().find(|n| {
        n.caip_network_id() == *caip_network_id
            || n.deprecated_caip_network_id.as_ref() == Some(caip_network_id)
    })
}
