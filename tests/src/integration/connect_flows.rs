//! # Connect Flows
//!
//! Registry (ak-01) → proposal namespaces (ak-02) → WalletConnect pairing
//! and provider events (ak-04) → per-namespace connections (ak-03).

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ak_01_connector_registry::ConnectorRegistryApi;
    use ak_02_namespace_builder::{get_chains_from_namespaces, NamespaceOverrides};
    use ak_03_connection_manager::ConnectionManagerApi;
    use ak_04_provider_bridge::InMemoryUniversalProvider;
    use ak_05_siwx::SiwxHost;
    use appkit_bus::{AppKitEvent, EventFilter, EventTopic};
    use appkit_runtime::{AppKit, AppKitConfig};
    use appkit_types::{
        mock::MockWalletProvider, networks, ChainNamespace, Connector, ConnectorType,
        ProviderEvent, ProviderHandle, Session, SessionNamespace, SessionNamespaces,
        UniversalProvider, WALLET_CONNECT_CONNECTOR_ID,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn multi_chain_config() -> AppKitConfig {
        AppKitConfig {
            project_id: "project".into(),
            networks: vec![
                "eip155:1".into(),
                "eip155:137".into(),
                networks::solana().caip_network_id().to_string(),
            ],
            ..Default::default()
        }
    }

    fn session(accounts: &[(ChainNamespace, &str)]) -> Session {
        let mut namespaces = SessionNamespaces::new();
        for (namespace, account) in accounts {
            namespaces
                .entry(namespace.clone())
                .or_insert_with(SessionNamespace::default)
                .accounts
                .push(account.to_string());
        }
        Session {
            topic: "integration".into(),
            namespaces,
            ..Default::default()
        }
    }

    fn started(config: AppKitConfig) -> (Arc<AppKit>, Arc<InMemoryUniversalProvider>) {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = Arc::new(AppKit::new(config, provider.clone()).unwrap());
        appkit.start();
        (appkit, provider)
    }

    // =========================================================================
    // WALLETCONNECT
    // =========================================================================

    /// The proposal carries every requested chain, with legacy aliases.
    #[test]
    fn test_proposal_covers_requested_networks() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(multi_chain_config(), provider).unwrap();
        let proposal = appkit.proposal_namespaces();

        let eip155 = &proposal[&ChainNamespace::Eip155];
        assert_eq!(eip155.chains, vec!["eip155:1", "eip155:137"]);
        assert!(eip155.methods.iter().any(|m| m == "personal_sign"));
        assert!(eip155.rpc_map.contains_key("137"));

        let solana = &proposal[&ChainNamespace::Solana];
        assert_eq!(solana.chains.len(), 2, "current id plus deprecated alias");
    }

    /// Overrides from configuration replace the generated proposal.
    #[test]
    fn test_proposal_applies_overrides() {
        let mut config = multi_chain_config();
        let mut overrides = NamespaceOverrides::default();
        overrides
            .methods
            .insert(ChainNamespace::Eip155, vec!["eth_sendTransaction".into()]);
        config.universal_provider_overrides = overrides;

        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config, provider).unwrap();
        assert_eq!(
            appkit.proposal_namespaces()[&ChainNamespace::Eip155].methods,
            vec!["eth_sendTransaction"]
        );
    }

    /// A multi-namespace pairing lands a connection in each manager.
    #[tokio::test]
    async fn test_walletconnect_pairing_populates_every_namespace() {
        let (appkit, provider) = started(multi_chain_config());
        let solana_account = format!("{}:So1ana", networks::solana().caip_network_id());
        provider.script_connect(Ok(session(&[
            (ChainNamespace::Eip155, "eip155:1:0xAbC"),
            (ChainNamespace::Solana, &solana_account),
        ])));
        let mut events = appkit
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Account]));

        let connected = appkit.connect_walletconnect().await.unwrap();
        assert_eq!(connected.len(), 2);

        for namespace in [ChainNamespace::Eip155, ChainNamespace::Solana] {
            let manager = appkit.manager(&namespace).unwrap();
            assert_eq!(manager.connections().len(), 1, "{namespace}");
            assert_eq!(
                appkit.registry.get_connector_id(&namespace).as_deref(),
                Some(WALLET_CONNECT_CONNECTOR_ID)
            );
        }

        let chains = get_chains_from_namespaces(&provider.session().unwrap().namespaces);
        assert!(chains.contains(&"eip155:1".to_string()));
        assert_eq!(
            events.drain().first(),
            Some(&AppKitEvent::AccountChanged {
                namespace: ChainNamespace::Eip155,
                caip_address: Some("eip155:1:0xAbC".into()),
            })
        );
    }

    /// Wallet-side account switches follow through to the active account.
    #[tokio::test]
    async fn test_accounts_changed_event_switches_account() {
        let (appkit, provider) = started(multi_chain_config());
        provider.script_connect(Ok(session(&[
            (ChainNamespace::Eip155, "eip155:1:0xAbC"),
            (ChainNamespace::Eip155, "eip155:1:0xDeF"),
        ])));
        provider.set_default_chain(ChainNamespace::Eip155, "1");
        appkit.connect_walletconnect().await.unwrap();

        provider.emit(ProviderEvent::AccountsChanged(vec!["0xdef".into()]));
        assert_eq!(
            appkit.state.active_caip_address().map(|a| a.to_string()),
            Some("eip155:1:0xDeF".to_string())
        );
    }

    /// A wallet-initiated disconnect settles every namespace.
    #[tokio::test]
    async fn test_wallet_disconnect_event() {
        let (appkit, provider) = started(multi_chain_config());
        provider.script_connect(Ok(session(&[(ChainNamespace::Eip155, "eip155:137:0xAbC")])));
        appkit.connect_walletconnect().await.unwrap();

        provider.disconnect().await.unwrap();
        assert!(!appkit.state.is_connected());
        assert!(appkit.registry.get_connector_id(&ChainNamespace::Eip155).is_none());
        assert!(appkit
            .manager(&ChainNamespace::Eip155)
            .unwrap()
            .connections()
            .is_empty());
    }

    // =========================================================================
    // INJECTED WALLETS
    // =========================================================================

    /// One wallet announced on two namespaces is merged, yet connects per
    /// namespace.
    #[tokio::test]
    async fn test_multi_chain_wallet_connects_per_namespace() {
        let (appkit, _) = started(multi_chain_config());
        let evm = MockWalletProvider::new().with_address("0xAbC").with_chain_id(1);
        let sol = MockWalletProvider::new().with_address("So1ana");
        appkit.registry.add_connector(
            Connector::new("phantom", "Phantom", ConnectorType::Injected, ChainNamespace::Eip155)
                .with_provider(ProviderHandle::new(evm)),
        );
        appkit.registry.add_connector(
            Connector::new("phantom", "Phantom", ConnectorType::Injected, ChainNamespace::Solana)
                .with_provider(ProviderHandle::new(sol)),
        );

        let merged = appkit.registry.get_connectors();
        assert_eq!(merged.len(), 1);
        assert!(merged[0].is_multi_chain());

        let sol_address = appkit
            .connect_wallet("phantom", &ChainNamespace::Solana)
            .await
            .unwrap();
        assert_eq!(sol_address.namespace, ChainNamespace::Solana);
        assert_eq!(sol_address.address, "So1ana");
        assert_eq!(
            appkit.state.active_caip_network().map(|n| n.chain_namespace),
            Some(ChainNamespace::Solana)
        );

        let evm_address = appkit
            .connect_wallet("phantom", &ChainNamespace::Eip155)
            .await
            .unwrap();
        assert_eq!(evm_address.to_string(), "eip155:1:0xAbC");
        assert!(appkit.registry.is_connected(Some(&ChainNamespace::Solana)));
        assert!(appkit.registry.is_connected(Some(&ChainNamespace::Eip155)));
    }

    /// Disconnecting one namespace leaves the other connected.
    #[tokio::test]
    async fn test_disconnect_is_scoped_to_namespace() {
        let (appkit, _) = started(multi_chain_config());
        let evm = Arc::new(MockWalletProvider::new().with_address("0xAbC").with_chain_id(1));
        appkit.registry.add_connector(
            Connector::new("metamask", "MetaMask", ConnectorType::Injected, ChainNamespace::Eip155)
                .with_provider(ProviderHandle(evm.clone())),
        );
        appkit.registry.add_connector(
            Connector::new("phantom", "Phantom", ConnectorType::Injected, ChainNamespace::Solana)
                .with_provider(ProviderHandle::new(MockWalletProvider::new().with_address("So1"))),
        );
        appkit
            .connect_wallet("phantom", &ChainNamespace::Solana)
            .await
            .unwrap();
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();

        appkit.disconnect(&ChainNamespace::Eip155).await.unwrap();
        assert_eq!(evm.disconnect_count(), 1);
        assert!(!appkit.registry.is_connected(Some(&ChainNamespace::Eip155)));
        assert_eq!(
            appkit.registry.get_connector_id(&ChainNamespace::Solana).as_deref(),
            Some("phantom")
        );
        assert_eq!(
            appkit
                .manager(&ChainNamespace::Solana)
                .unwrap()
                .connections()
                .len(),
            1
        );
    }
}
