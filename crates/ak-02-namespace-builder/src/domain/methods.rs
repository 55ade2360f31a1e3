//! Default RPC methods and events per namespace.

use appkit_types::{ChainNamespace, Namespace};

/// EVM methods requested by default.
pub const EIP155_METHODS: &[&str] = &[
    "eth_accounts",
    "eth_requestAccounts",
    "eth_sendRawTransaction",
    "eth_sign",
    "eth_signTransaction",
    "eth_signTypedData",
    "eth_signTypedData_v3",
    "eth_signTypedData_v4",
    "eth_sendTransaction",
    "personal_sign",
    "wallet_switchEthereumChain",
    "wallet_addEthereumChain",
    "wallet_getPermissions",
    "wallet_requestPermissions",
    "wallet_registerOnboarding",
    "wallet_watchAsset",
    "wallet_scanQRCode",
    // EIP-5792
    "wallet_getCallsStatus",
    "wallet_showCallsStatus",
    "wallet_sendCalls",
    "wallet_getCapabilities",
    // EIP-7715
    "wallet_grantPermissions",
    "wallet_revokePermissions",
    // EIP-7811
    "wallet_getAssets",
];

/// Solana methods requested by default.
pub const SOLANA_METHODS: &[&str] = &[
    "solana_signMessage",
    "solana_signTransaction",
    "solana_requestAccounts",
    "solana_getAccounts",
    "solana_signAllTransactions",
    "solana_signAndSendTransaction",
];

/// Bitcoin methods requested by default.
pub const BIP122_METHODS: &[&str] = &["sendTransfer", "signMessage", "signPsbt", "getAccountAddresses"];

/// Events requested for every namespace.
pub const DEFAULT_EVENTS: &[&str] = &["accountsChanged", "chainChanged"];

/// Method allow-list of a namespace; empty for namespaces without one.
pub fn get_methods_by_chain_namespace(namespace: &ChainNamespace) -> Vec<String> {
    let methods: &[&str] = match namespace {
        ChainNamespace::Eip155 => EIP155_METHODS,
        ChainNamespace::Solana => SOLANA_METHODS,
        ChainNamespace::Bip122 => BIP122_METHODS,
        _ => &[],
    };
    methods.iter().map(|m| m.to_string()).collect()
}

/// Fresh namespace with default methods and events, no chains.
pub fn create_default_namespace(namespace: &ChainNamespace) -> Namespace {
    Namespace {
        methods: get_methods_by_chain_namespace(namespace),
        chains: Vec::new(),
        events: DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect(),
        rpc_map: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_per_namespace() {
        assert_eq!(get_methods_by_chain_namespace(&ChainNamespace::Eip155).len(), 24);
        assert_eq!(get_methods_by_chain_namespace(&ChainNamespace::Solana).len(), 6);
        assert_eq!(get_methods_by_chain_namespace(&ChainNamespace::Bip122).len(), 4);
        assert!(get_methods_by_chain_namespace(&ChainNamespace::Polkadot).is_empty());
    }

    #[test]
    fn test_unknown_namespace_has_no_methods() {
        let ns = ChainNamespace::from_tag("nonexistent");
        assert!(get_methods_by_chain_namespace(&ns).is_empty());
    }

    #[test]
    fn test_default_namespace() {
        let ns = create_default_namespace(&ChainNamespace::Solana);
        assert_eq!(ns.events, vec!["accountsChanged", "chainChanged"]);
        assert!(ns.chains.is_empty());
        assert!(ns.rpc_map.is_empty());
        assert!(ns.methods.contains(&"solana_signMessage".to_string()));
    }
}
