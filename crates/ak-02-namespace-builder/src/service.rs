//! Namespace Builder Service
//!
//! Folds requested networks into WalletConnect proposal namespaces and
//! derives chain ids from established sessions.

use crate::domain::{apply_namespace_overrides, create_default_namespace, NamespaceOverrides};
use crate::ports::inbound::NamespaceBuilderApi;
use appkit_types::networks::{
    SOLANA_DEVNET_DEPRECATED_REF, SOLANA_DEVNET_REF, SOLANA_MAINNET_DEPRECATED_REF,
    SOLANA_MAINNET_REF,
};
use appkit_types::{CaipNetwork, ChainNamespace, NamespaceConfig, SessionNamespaces};
use tracing::debug;

/// Legacy ids some wallets still expect alongside the current Solana ids.
const DEPRECATED_CHAIN_ALIASES: &[(&str, &str)] = &[
    (SOLANA_MAINNET_REF, SOLANA_MAINNET_DEPRECATED_REF),
    (SOLANA_DEVNET_REF, SOLANA_DEVNET_DEPRECATED_REF),
];

fn deprecated_alias(namespace: &ChainNamespace, reference: &str) -> Option<String> {
    if *namespace != ChainNamespace::Solana {
        return None;
    }
    DEPRECATED_CHAIN_ALIASES
        .iter()
        .find(|(current, _)| *current == reference)
        .map(|(_, legacy)| format!("{namespace}:{legacy}"))
}

/// Build proposal namespaces for `networks`, then apply `overrides`.
pub fn create_namespaces(
    networks: &[CaipNetwork],
    overrides: Option<&NamespaceOverrides>,
) -> NamespaceConfig {
    let mut config = NamespaceConfig::new();

    for network in networks {
        let namespace = config
            .entry(network.chain_namespace.clone())
            .or_insert_with(|| create_default_namespace(&network.chain_namespace));

        namespace
            .chains
            .push(network.caip_network_id().to_string());
        if let Some(alias) = deprecated_alias(&network.chain_namespace, &network.id) {
            namespace.chains.push(alias);
        }
        if let Some(rpc_url) = network.default_rpc_url() {
            namespace
                .rpc_map
                .insert(network.id.clone(), rpc_url.to_string());
        }
    }

    apply_namespace_overrides(&config, overrides)
}

/// Every chain implicated by a session: declared chains, then chains
/// implied by CAIP-10 accounts, deduplicated per namespace.
pub fn get_chains_from_namespaces(namespaces: &SessionNamespaces) -> Vec<String> {
    namespaces
        .values()
        .flat_map(|namespace| {
            let declared = namespace.chains.iter().flatten().cloned();
            let implied = namespace.accounts.iter().filter_map(|account| {
                let mut parts = account.split(':');
                match (parts.next(), parts.next()) {
                    (Some(ns), Some(reference)) => Some(format!("{ns}:{reference}")),
                    _ => None,
                }
            });

            let mut chains: Vec<String> = Vec::new();
            for chain in declared.chain(implied) {
                if !chains.contains(&chain) {
                    chains.push(chain);
                }
            }
            chains
        })
        .collect()
}

/// Namespace builder bound to the application's overrides.
#[derive(Clone, Debug, Default)]
pub struct NamespaceBuilder {
    overrides: Option<NamespaceOverrides>,
}

impl NamespaceBuilder {
    /// Builder without overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder applying `overrides` to every result.
    #[must_use]
    pub fn with_overrides(overrides: NamespaceOverrides) -> Self {
        Self {
            overrides: (!overrides.is_empty()).then_some(overrides),
        }
    }

    /// The configured overrides.
    #[must_use]
    pub fn overrides(&self) -> Option<&NamespaceOverrides> {
        self.overrides.as_ref()
    }
}

impl NamespaceBuilderApi for NamespaceBuilder {
    fn create_namespaces(&self, networks: &[CaipNetwork]) -> NamespaceConfig {
        let config = create_namespaces(networks, self.overrides.as_ref());
        debug!(
            "[ak-02] Built {} namespaces from {} networks",
            config.len(),
            networks.len()
        );
        config
    }

    fn chains_from_session(&self, namespaces: &SessionNamespaces) -> Vec<String> {
        get_chains_from_namespaces(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appkit_types::networks;
    use appkit_types::{NativeCurrency, SessionNamespace};

    fn evm(id: &str, rpc: &str) -> CaipNetwork {
        CaipNetwork::new(id, id, ChainNamespace::Eip155, NativeCurrency::new("Ether", "ETH", 18), Some(rpc))
    }

    #[test]
    fn test_create_namespaces_evm() {
        let config = create_namespaces(
            &[evm("1", "https://mainnet.example"), evm("137", "https://polygon.example")],
            None,
        );

        assert_eq!(config.len(), 1);
        let eip155 = &config[&ChainNamespace::Eip155];
        assert_eq!(eip155.chains, vec!["eip155:1", "eip155:137"]);
        assert_eq!(eip155.events, vec!["accountsChanged", "chainChanged"]);
        assert_eq!(eip155.rpc_map["1"], "https://mainnet.example");
        assert_eq!(eip155.rpc_map["137"], "https://polygon.example");
        assert_eq!(eip155.methods.len(), 24);
    }

    #[test]
    fn test_solana_legacy_alias() {
        let config = create_namespaces(&[networks::solana(), networks::solana_devnet()], None);
        let solana = &config[&ChainNamespace::Solana];
        assert_eq!(
            solana.chains,
            vec![
                "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
                "solana:4sGjMW1sUnHzSxGspuhpqLDx6wiyjNtZ",
                "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
                "solana:8E9rvCKLFQia2Y35HXjjpWzj8weVo44K",
            ]
        );
    }

    #[test]
    fn test_network_without_rpc() {
        let config = create_namespaces(&[networks::bitcoin()], None);
        assert!(config[&ChainNamespace::Bip122].rpc_map.is_empty());
    }

    #[test]
    fn test_builder_applies_overrides() {
        let mut overrides = NamespaceOverrides::default();
        overrides
            .chains
            .insert(ChainNamespace::Eip155, vec!["eip155:10".into()]);
        let builder = NamespaceBuilder::with_overrides(overrides);
        let config = builder.create_namespaces(&[evm("1", "https://mainnet.example")]);
        assert_eq!(config[&ChainNamespace::Eip155].chains, vec!["eip155:10"]);
        assert!(NamespaceBuilder::with_overrides(NamespaceOverrides::default())
            .overrides()
            .is_none());
    }

    #[test]
    fn test_chains_from_namespaces() {
        let mut namespaces = SessionNamespaces::new();
        namespaces.insert(
            ChainNamespace::Eip155,
            SessionNamespace {
                chains: Some(vec!["eip155:1".into()]),
                accounts: vec!["eip155:4000:0x1".into(), "eip155:1:0x1".into()],
                ..Default::default()
            },
        );
        assert_eq!(get_chains_from_namespaces(&namespaces), vec!["eip155:1", "eip155:4000"]);
    }

    #[test]
    fn test_chains_from_namespaces_without_declared_chains() {
        let mut namespaces = SessionNamespaces::new();
        namespaces.insert(
            ChainNamespace::Solana,
            SessionNamespace {
                chains: None,
                accounts: vec!["solana:abc:Addr1".into()],
                ..Default::default()
            },
        );
        assert_eq!(get_chains_from_namespaces(&namespaces), vec!["solana:abc"]);
    }
}
