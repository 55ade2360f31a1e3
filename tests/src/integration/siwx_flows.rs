//! # SIWX Flows
//!
//! Connect (ak-03/ak-04) → sign-in prompt and signature (ak-05) →
//! disconnect and session revocation, driven through the runtime's client
//! state as the SIWX host.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use ak_01_connector_registry::ConnectorRegistryApi;
    use ak_04_provider_bridge::InMemoryUniversalProvider;
    use ak_05_siwx::{
        InMemorySiwxConfig, SiwxConfig, SiwxEngineApi, SiwxError, SiwxHost, SiwxInput,
        SiwxMessage, SiwxSession,
    };
    use appkit_bus::{AppKitEvent, EventFilter};
    use appkit_runtime::container::SiwxSettings;
    use appkit_runtime::{AppKit, AppKitConfig, ModalView};
    use appkit_types::{
        mock::MockWalletProvider, networks, AuthenticateResult, Cacao, CacaoPayload,
        CacaoSignature, CaipNetworkId, ChainNamespace, Connector, ConnectorType, ProviderHandle,
        Session, SessionNamespace, SessionNamespaces,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn config(required: bool) -> AppKitConfig {
        AppKitConfig {
            project_id: "project".into(),
            networks: vec!["eip155:1".into(), "eip155:137".into()],
            siwx: SiwxSettings {
                enabled: true,
                required,
                domain: "app.example".into(),
                uri: "https://app.example".into(),
                statement: Some("Sign in to App".into()),
                expiration_secs: Some(3600),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn with_metamask(appkit: &AppKit) -> Arc<MockWalletProvider> {
        let wallet = Arc::new(
            MockWalletProvider::new()
                .with_address("0xAbC")
                .with_chain_id(1)
                .with_signature("0xsig"),
        );
        appkit.registry.add_connector(
            Connector::new("metamask", "MetaMask", ConnectorType::Injected, ChainNamespace::Eip155)
                .with_provider(ProviderHandle(wallet.clone())),
        );
        wallet
    }

    fn track_names(events: Vec<AppKitEvent>) -> Vec<&'static str> {
        events
            .into_iter()
            .filter_map(|e| match e {
                AppKitEvent::Track(t) => Some(t.name()),
                _ => None,
            })
            .collect()
    }

    /// Counts writes, delegating to the in-memory store.
    struct CountingConfig {
        inner: InMemorySiwxConfig,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl SiwxConfig for CountingConfig {
        async fn create_message(&self, input: SiwxInput) -> Result<SiwxMessage, SiwxError> {
            self.inner.create_message(input).await
        }

        async fn add_session(&self, session: SiwxSession) -> Result<(), SiwxError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.add_session(session).await
        }

        async fn revoke_session(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError> {
            self.inner.revoke_session(chain_id, address).await
        }

        async fn set_sessions(&self, sessions: Vec<SiwxSession>) -> Result<(), SiwxError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set_sessions(sessions).await
        }

        async fn get_sessions(
            &self,
            chain_id: &CaipNetworkId,
            address: &str,
        ) -> Result<Vec<SiwxSession>, SiwxError> {
            self.inner.get_sessions(chain_id, address).await
        }
    }

    // =========================================================================
    // SIGN-IN AFTER CONNECT
    // =========================================================================

    /// Connect, prompt, sign; a later reconnect finds the session.
    #[tokio::test]
    async fn test_connect_sign_and_reconnect() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(false), provider).unwrap();
        with_metamask(&appkit);
        let mut events = appkit.event_bus.subscribe(EventFilter::all());

        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        assert_eq!(appkit.state.view(), ModalView::SiwxSignMessage);
        assert!(!appkit.siwx.is_close_disabled().await);

        appkit.siwx.request_sign_message().await.unwrap();
        assert_eq!(appkit.state.view(), ModalView::Closed);
        let sessions = appkit.siwx.get_sessions(None, None).await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].signature, "0xsig");
        assert_eq!(
            sessions[0].data.metadata.statement.as_deref(),
            Some("Sign in to App")
        );
        assert!(sessions[0].message.contains("0xAbC"));
        assert!(sessions[0].data.identifier.expiration_time.is_some());
        assert_eq!(track_names(events.drain()), vec!["SIWX_AUTH_SUCCESS"]);

        // Same account again: no prompt.
        appkit.state.close_prompt();
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        assert_eq!(appkit.state.view(), ModalView::Closed);
    }

    /// Switching to a network without a session prompts again.
    #[tokio::test]
    async fn test_network_switch_prompts_for_new_chain() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(false), provider).unwrap();
        with_metamask(&appkit);
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        appkit.siwx.request_sign_message().await.unwrap();

        appkit
            .switch_network(&networks::polygon().caip_network_id())
            .await
            .unwrap();
        assert!(appkit.state.is_prompt_open());
        assert_eq!(appkit.siwx.get_all_sessions().await.len(), 1);
    }

    // =========================================================================
    // CANCELLATION
    // =========================================================================

    /// Required sign-in without any session: cancelling disconnects.
    #[tokio::test]
    async fn test_cancel_required_disconnects_wallet() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(true), provider).unwrap();
        let wallet = with_metamask(&appkit);
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        assert!(appkit.siwx.is_close_disabled().await);

        appkit.siwx.cancel_sign_message().await.unwrap();
        assert_eq!(wallet.disconnect_count(), 1);
        assert!(!appkit.state.is_connected());
        assert_eq!(appkit.state.view(), ModalView::Closed);
    }

    /// Required sign-in with a session elsewhere: cancelling switches back.
    #[tokio::test]
    async fn test_cancel_required_returns_to_signed_network() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(true), provider).unwrap();
        let wallet = with_metamask(&appkit);
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        appkit.siwx.request_sign_message().await.unwrap();

        appkit
            .switch_network(&networks::polygon().caip_network_id())
            .await
            .unwrap();
        assert!(appkit.state.is_prompt_open());

        appkit.siwx.cancel_sign_message().await.unwrap();
        assert_eq!(wallet.disconnect_count(), 0);
        assert_eq!(
            appkit.state.active_caip_network().map(|n| n.caip_network_id()),
            Some(networks::mainnet().caip_network_id())
        );
        assert!(!appkit.state.is_prompt_open());
    }

    // =========================================================================
    // ONE-CLICK AUTH
    // =========================================================================

    /// EVM-only WalletConnect pairing signs in within `authenticate`.
    #[tokio::test]
    async fn test_walletconnect_one_click_auth() {
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let mut namespaces = SessionNamespaces::new();
        namespaces.insert(
            ChainNamespace::Eip155,
            SessionNamespace {
                accounts: vec!["eip155:1:0xAbC".into()],
                ..Default::default()
            },
        );
        provider.script_authenticate(Ok(AuthenticateResult {
            session: Session {
                topic: "auth".into(),
                namespaces,
                ..Default::default()
            },
            auths: vec![Cacao {
                p: CacaoPayload {
                    domain: "app.example".into(),
                    aud: "https://app.example".into(),
                    nonce: "n".into(),
                    iss: "did:pkh:eip155:1:0xAbC".into(),
                    iat: Some("2026-01-01T00:00:00Z".into()),
                    ..Default::default()
                },
                s: CacaoSignature {
                    t: "eip191".into(),
                    s: "0xcacao".into(),
                    m: None,
                },
                ..Default::default()
            }],
        }));

        let appkit = Arc::new(AppKit::new(config(false), provider.clone()).unwrap());
        appkit.start();
        let connected = appkit.connect_walletconnect().await.unwrap();

        assert_eq!(connected[0].to_string(), "eip155:1:0xAbC");
        assert!(provider.connect_calls().is_empty());
        let params = &provider.authenticate_calls()[0];
        assert_eq!(params.chains, vec!["eip155:1", "eip155:137"]);
        assert!(params.methods.iter().any(|m| m == "personal_sign"));

        assert!(!appkit.state.is_prompt_open());
        assert_eq!(
            appkit.state.last_authenticated_network(),
            Some(networks::mainnet().caip_network_id())
        );
        assert_eq!(appkit.siwx.get_sessions(None, None).await.len(), 1);
    }

    // =========================================================================
    // DISCONNECT
    // =========================================================================

    /// Disconnecting revokes the account's session on the active chain.
    #[tokio::test]
    async fn test_disconnect_revokes_session() {
        let siwx = Arc::new(CountingConfig {
            inner: InMemorySiwxConfig::new("app.example", "https://app.example"),
            writes: AtomicUsize::new(0),
        });
        let provider = Arc::new(InMemoryUniversalProvider::new());
        let appkit = AppKit::new(config(false), provider)
            .unwrap()
            .with_siwx_config(siwx.clone());
        with_metamask(&appkit);
        appkit
            .connect_wallet("metamask", &ChainNamespace::Eip155)
            .await
            .unwrap();
        appkit.siwx.request_sign_message().await.unwrap();
        assert_eq!(siwx.writes.load(Ordering::SeqCst), 1);

        appkit.disconnect(&ChainNamespace::Eip155).await.unwrap();
        assert!(!appkit.state.is_connected());
        assert!(siwx
            .get_sessions(&networks::mainnet().caip_network_id(), "0xAbC")
            .await
            .unwrap()
            .is_empty());
    }
}
