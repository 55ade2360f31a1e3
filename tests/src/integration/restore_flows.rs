//! # Restore Flows
//!
//! Connection history → sync (ak-03, one manager per namespace) → registry
//! connector ids (ak-01) → active account.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ak_01_connector_registry::ConnectorRegistryApi;
    use ak_03_connection_manager::{ConnectionManagerApi, ConnectionState, ProbeOutcome};
    use ak_04_provider_bridge::InMemoryUniversalProvider;
    use ak_05_siwx::SiwxHost;
    use appkit_bus::{AppKitEvent, EventFilter};
    use appkit_runtime::{AppKit, AppKitConfig};
    use appkit_types::{
        mock::MockWalletProvider, networks, ChainNamespace, Connector, ConnectorType,
        ProviderError, ProviderHandle, Session, SessionNamespace, SessionNamespaces,
        WALLET_CONNECT_CONNECTOR_ID,
    };

    fn config() -> AppKitConfig {
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

    fn injected(id: &str, namespace: ChainNamespace, provider: MockWalletProvider) -> Connector {
        Connector::new(id, id, ConnectorType::Injected, namespace)
            .with_provider(ProviderHandle::new(provider))
    }

    /// Previously connected wallets are restored; a failing one is isolated.
    #[tokio::test]
    async fn test_sync_isolates_failing_connector() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(), provider).unwrap();
        appkit.registry.set_connectors(vec![
            injected(
                "metamask",
                ChainNamespace::Eip155,
                MockWalletProvider::new().with_accounts(&["0xAbC"]).with_chain_id(137),
            ),
            injected(
                "broken",
                ChainNamespace::Solana,
                MockWalletProvider::new().failing(ProviderError::Request("locked".into())),
            ),
            injected(
                "phantom",
                ChainNamespace::Solana,
                MockWalletProvider::new().with_address("So1"),
            ),
        ]);
        for id in ["metamask", "broken", "phantom"] {
            appkit.status.mark_connected(id);
        }
        let mut events = appkit.event_bus.subscribe(EventFilter::all());

        let reports = appkit.sync_connections().await;

        let evm = &reports[&ChainNamespace::Eip155];
        assert!(evm.is_clean());
        assert!(matches!(
            evm.outcomes.iter().find(|(id, _)| id == "metamask"),
            Some((_, ProbeOutcome::Connected(_)))
        ));

        let solana = &reports[&ChainNamespace::Solana];
        assert_eq!(solana.connections().count(), 1);
        let failures: Vec<_> = solana.failures().map(|(id, _)| id.to_string()).collect();
        assert_eq!(failures, vec!["broken"]);

        let evm_manager = appkit.manager(&ChainNamespace::Eip155).unwrap();
        assert_eq!(evm_manager.connector_state("metamask"), ConnectionState::Connected);
        let solana_manager = appkit.manager(&ChainNamespace::Solana).unwrap();
        assert_ne!(solana_manager.connector_state("broken"), ConnectionState::Connected);
        assert_eq!(solana_manager.connector_state("phantom"), ConnectionState::Connected);

        assert_eq!(
            appkit.state.active_caip_address().map(|a| a.to_string()),
            Some("eip155:137:0xAbC".to_string())
        );
        assert!(events
            .drain()
            .iter()
            .any(|e| matches!(e, AppKitEvent::ProbeFailed { connector_id, .. } if connector_id == "broken")));
    }

    /// Wallets without connection history are not probed.
    #[tokio::test]
    async fn test_sync_skips_wallets_without_history() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(), provider).unwrap();
        let wallet = Arc::new(MockWalletProvider::new().with_accounts(&["0xAbC"]).with_chain_id(1));
        appkit.registry.add_connector(
            Connector::new("metamask", "MetaMask", ConnectorType::Injected, ChainNamespace::Eip155)
                .with_provider(ProviderHandle(wallet.clone())),
        );
        appkit.status.mark_disconnected("metamask");

        let reports = appkit.sync_connections().await;
        assert_eq!(reports[&ChainNamespace::Eip155].skipped, vec!["metamask"]);
        assert!(wallet.connect_calls().is_empty());
        assert!(!appkit.state.is_connected());
    }

    /// An existing WalletConnect session is picked up by the sync.
    #[tokio::test]
    async fn test_sync_restores_walletconnect_session() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let mut namespaces = SessionNamespaces::new();
        namespaces.insert(
            ChainNamespace::Eip155,
            SessionNamespace {
                accounts: vec!["eip155:137:0xAbC".into()],
                ..Default::default()
            },
        );
        provider.set_session(Some(Session {
            topic: "restored".into(),
            namespaces,
            ..Default::default()
        }));

        let appkit = AppKit::new(config(), provider).unwrap();
        appkit.registry.add_connector(Connector::new(
            WALLET_CONNECT_CONNECTOR_ID,
            "WalletConnect",
            ConnectorType::WalletConnect,
            ChainNamespace::Eip155,
        ));
        appkit.status.mark_connected(WALLET_CONNECT_CONNECTOR_ID);

        appkit.sync_connections().await;
        assert_eq!(
            appkit.registry.get_connector_id(&ChainNamespace::Eip155).as_deref(),
            Some(WALLET_CONNECT_CONNECTOR_ID)
        );
        assert_eq!(
            appkit.state.active_caip_network().map(|n| n.id),
            Some("137".to_string())
        );
        assert!(appkit.state.is_connected());
    }
}
