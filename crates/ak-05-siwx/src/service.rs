//! SIWX Engine Service
//!
//! Drives the two sign-in transports:
//!
//! - **Post-connect challenge**: after a wallet connects, prompt for a
//!   signature unless a valid session exists, then store the session.
//! - **Protocol-level authentication**: a single-namespace EVM
//!   WalletConnect proposal carries the challenge, and the returned CACAOs
//!   become sessions.
//!
//! When the config requires a session, cancelling the prompt switches back
//! to the last authenticated network if it still holds a session, else
//! disconnects.

use crate::domain::{
    SiwxError, SiwxIdentifier, SiwxInput, SiwxMessage, SiwxMessageData, SiwxMetadata,
    SiwxSession, ACCOUNT_ADDRESS_PLACEHOLDER,
};
use crate::ports::inbound::SiwxEngineApi;
use crate::ports::outbound::{
    AuthConnectRequest, AuthConnectResult, AuthConnector, SerializedSiwxMessage, SiwxConfig,
    SiwxHost,
};
use appkit_bus::{AppKitEvent, EventPublisher, InMemoryEventBus, SiwxEventProperties, TrackEvent};
use appkit_types::{
    parse_caip_network_id, AuthenticateParams, Cacao, CaipAddress, CaipNetwork, CaipNetworkId,
    ChainNamespace, UniversalProvider,
};
use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

type SessionWrite = Shared<BoxFuture<'static, Result<(), SiwxError>>>;

/// SIWX engine implementation
pub struct SiwxEngine {
    config: Option<Arc<dyn SiwxConfig>>,
    host: Arc<dyn SiwxHost>,
    event_bus: Option<Arc<InMemoryEventBus>>,
    in_flight: Arc<Mutex<Option<SessionWrite>>>,
}

impl SiwxEngine {
    /// Engine without a config; every operation is a no-op.
    pub fn new(host: Arc<dyn SiwxHost>) -> Self {
        Self {
            config: None,
            host,
            event_bus: None,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Enable SIWX with `config`.
    #[must_use]
    pub fn with_config(mut self, config: Arc<dyn SiwxConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Publish track events on `bus`.
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<InMemoryEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// The installed config.
    pub fn config(&self) -> Option<&Arc<dyn SiwxConfig>> {
        self.config.as_ref()
    }

    fn track(&self, event: fn(SiwxEventProperties) -> TrackEvent, message: Option<String>) {
        let Some(bus) = &self.event_bus else {
            return;
        };
        let properties = SiwxEventProperties {
            network: self
                .host
                .active_caip_network()
                .map(|n| n.caip_network_id().to_string())
                .unwrap_or_default(),
            is_smart_account: self.host.is_smart_account(),
            message,
        };
        bus.emit(AppKitEvent::Track(event(properties)));
    }

    async fn await_in_flight(&self) {
        let pending = self.in_flight.lock().clone();
        if let Some(pending) = pending {
            if let Err(e) = pending.await {
                debug!("[ak-05] Pending session write failed: {}", e);
            }
        }
    }

    async fn sign_and_store(
        &self,
        config: &dyn SiwxConfig,
        address: CaipAddress,
        network: &CaipNetwork,
    ) -> Result<(), SiwxError> {
        let chain_id = network.caip_network_id();

        let message = config
            .create_message(SiwxInput::new(address.address, chain_id.clone()))
            .await?;
        let text = message.to_string();
        let signature = self.host.sign_message(&text).await?;
        if signature.is_empty() {
            return Err(SiwxError::Authentication("Empty signature".to_string()));
        }

        config
            .add_session(SiwxSession::new(message.into_data(), text, signature))
            .await?;
        self.host.set_last_authenticated_network(chain_id);
        Ok(())
    }

    fn message_chain(&self, chains: &[CaipNetworkId]) -> Option<CaipNetworkId> {
        let active = self.host.active_caip_network().map(|n| n.caip_network_id());
        active
            .filter(|id| chains.contains(id))
            .or_else(|| chains.first().cloned())
    }

    async fn fail_authentication(&self, provider: &dyn UniversalProvider, error: SiwxError) -> SiwxError {
        error!(error = %error, "[ak-05] Failed to store authenticated sessions");
        self.track(TrackEvent::SiwxAuthError, Some(error.to_string()));
        if let Err(e) = provider.disconnect().await {
            warn!(error = %e, "[ak-05] Failed to disconnect after authentication error");
        }
        error
    }
}

fn cacao_session(
    provider: &dyn UniversalProvider,
    cacao: &Cacao,
    message: &SiwxMessage,
) -> Option<SiwxSession> {
    let chain_id = match parse_caip_network_id(&cacao.chain_id()) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, iss = %cacao.p.iss, "[ak-05] Skipping auth with malformed issuer");
            return None;
        }
    };
    let p = &cacao.p;

    let data = SiwxMessageData {
        input: SiwxInput {
            account_address: cacao.account_address(),
            chain_id,
            not_before: p.nbf.clone(),
        },
        metadata: SiwxMetadata {
            domain: p.domain.clone(),
            uri: p.aud.clone(),
            version: p
                .version
                .clone()
                .unwrap_or_else(|| message.metadata.version.clone()),
            nonce: p.nonce.clone(),
            statement: p.statement.clone(),
            resources: p.resources.clone(),
        },
        identifier: SiwxIdentifier {
            request_id: p.request_id.clone(),
            issued_at: p.iat.clone(),
            expiration_time: p.exp.clone(),
        },
    };

    Some(SiwxSession {
        data,
        message: provider.format_auth_message(cacao),
        signature: cacao.s.s.clone(),
        cacao: Some(cacao.clone()),
    })
}

#[async_trait]
impl SiwxEngineApi for SiwxEngine {
    fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn initialize_if_enabled(&self, caip_address: Option<&CaipAddress>) {
        let (Some(config), Some(address)) = (&self.config, caip_address) else {
            return;
        };
        let Some(network) = self.host.active_caip_network() else {
            return;
        };
        let chain_id = network.caip_network_id();
        if !self.host.is_network_supported(&chain_id) {
            debug!("[ak-05] SIWX not supported on {}", chain_id);
            return;
        }

        self.await_in_flight().await;

        match config.get_sessions(&chain_id, &address.address).await {
            Ok(sessions) if sessions.is_empty() => {
                info!("[ak-05] No session for {}, prompting", address);
                self.host.open_prompt();
            }
            Ok(sessions) => debug!("[ak-05] {} sessions found for {}", sessions.len(), address),
            Err(e) => {
                error!(error = %e, "[ak-05] Failed to load sessions");
                self.track(TrackEvent::SiwxAuthError, Some(e.to_string()));
                if let Err(e) = self.host.disconnect().await {
                    warn!(error = %e, "[ak-05] Failed to disconnect");
                }
                self.host.reset_to_connect();
            }
        }
    }

    async fn request_sign_message(&self) -> Result<(), SiwxError> {
        let config = self.config.as_ref().ok_or(SiwxError::Disabled)?;
        let address = self
            .host
            .active_caip_address()
            .ok_or(SiwxError::NoActiveAddress)?;
        let network = self
            .host
            .active_caip_network()
            .ok_or(SiwxError::NoActiveNetwork)?;

        // Past the preconditions, failures surface through the prompt.
        match self.sign_and_store(&**config, address, &network).await {
            Ok(()) => {
                self.host.close_prompt();
                self.track(TrackEvent::SiwxAuthSuccess, None);
            }
            Err(e) => {
                if !self.host.is_prompt_open() {
                    self.host.open_prompt();
                }
                self.track(TrackEvent::SiwxAuthError, Some(e.to_string()));
                error!(error = %e, "[ak-05] Failed to sign SIWX message");
            }
        }

        Ok(())
    }

    async fn cancel_sign_message(&self) -> Result<(), SiwxError> {
        let required = self.config.as_ref().is_some_and(|c| c.get_required());

        if required {
            let mut fallback = None;
            if let Some(last) = self.host.last_authenticated_network() {
                if !self.get_sessions(Some(&last), None).await.is_empty() {
                    fallback = self
                        .host
                        .requested_networks()
                        .into_iter()
                        .find(|n| n.caip_network_id() == last);
                }
            }

            let outcome = match fallback {
                Some(network) => {
                    info!("[ak-05] Sign-in cancelled, switching back to {}", network.caip_network_id());
                    self.host.switch_network(&network).await
                }
                None => {
                    info!("[ak-05] Sign-in cancelled, disconnecting");
                    self.host.disconnect().await
                }
            };
            if let Err(e) = outcome {
                warn!(error = %e, "[ak-05] Failed to leave the unauthenticated network");
            }
        }

        self.host.close_prompt();
        self.track(TrackEvent::ClickCancelSiwx, None);
        Ok(())
    }

    async fn get_sessions(
        &self,
        chain_id: Option<&CaipNetworkId>,
        address: Option<&str>,
    ) -> Vec<SiwxSession> {
        let Some(config) = &self.config else {
            return Vec::new();
        };
        let address = address
            .map(str::to_string)
            .or_else(|| self.host.active_caip_address().map(|a| a.address));
        let chain_id = chain_id
            .cloned()
            .or_else(|| self.host.active_caip_network().map(|n| n.caip_network_id()));
        let (Some(address), Some(chain_id)) = (address, chain_id) else {
            return Vec::new();
        };

        config
            .get_sessions(&chain_id, &address)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "[ak-05] Failed to read sessions");
                Vec::new()
            })
    }

    async fn get_all_sessions(&self) -> Vec<SiwxSession> {
        let (Some(config), Some(address)) = (&self.config, self.host.active_caip_address()) else {
            return Vec::new();
        };

        let reads = self.host.requested_networks().into_iter().map(|network| {
            let config = Arc::clone(config);
            let address = address.address.clone();
            async move {
                config
                    .get_sessions(&network.caip_network_id(), &address)
                    .await
                    .unwrap_or_default()
            }
        });

        join_all(reads).await.into_iter().flatten().collect()
    }

    async fn is_close_disabled(&self) -> bool {
        let required = self.config.as_ref().is_some_and(|c| c.get_required());
        required && self.get_sessions(None, None).await.is_empty()
    }

    async fn add_embedded_wallet_session(
        &self,
        data: SiwxMessageData,
        message: String,
        signature: String,
    ) -> Result<(), SiwxError> {
        let config = self.config.as_ref().ok_or(SiwxError::Disabled)?;

        let write = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let config = Arc::clone(config);
                    let session = SiwxSession::new(data, message, signature);
                    let release: Weak<Mutex<Option<SessionWrite>>> = Arc::downgrade(&self.in_flight);
                    // The write frees the slot itself, so a dropped caller
                    // cannot leave it occupied.
                    let write = async move {
                        let result = config.add_session(session).await;
                        if let Some(slot) = release.upgrade() {
                            slot.lock().take();
                        }
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(write.clone());
                    write
                }
            }
        };

        write.await
    }

    async fn universal_provider_authenticate(
        &self,
        provider: &dyn UniversalProvider,
        chains: &[CaipNetworkId],
        methods: &[String],
    ) -> Result<bool, SiwxError> {
        let Some(config) = &self.config else {
            return Ok(false);
        };
        let single_evm = !chains.is_empty()
            && chains.iter().all(|c| c.namespace == ChainNamespace::Eip155);
        let Some(chain_id) = self.message_chain(chains).filter(|_| single_evm) else {
            return Ok(false);
        };

        let message = config
            .create_message(SiwxInput::new("", chain_id.clone()))
            .await?;

        let mut requested = vec![chain_id.to_string()];
        requested.extend(chains.iter().filter(|c| **c != chain_id).map(|c| c.to_string()));

        let params = AuthenticateParams {
            nonce: message.metadata.nonce.clone(),
            domain: message.metadata.domain.clone(),
            uri: message.metadata.uri.clone(),
            exp: message.identifier.expiration_time.clone(),
            iat: message.identifier.issued_at.clone(),
            nbf: message.input.not_before.clone(),
            request_id: message.identifier.request_id.clone(),
            version: message.metadata.version.clone(),
            resources: message.metadata.resources.clone(),
            statement: message.metadata.statement.clone(),
            chain_id: message.input.chain_id.to_string(),
            methods: methods.to_vec(),
            chains: requested,
        };

        let result = match provider.authenticate(&params).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "[ak-05] Protocol-level authentication failed");
                self.track(TrackEvent::SiwxAuthError, Some(e.to_string()));
                return Err(e.into());
            }
        };

        let sessions: Vec<SiwxSession> = result
            .auths
            .iter()
            .filter_map(|cacao| cacao_session(provider, cacao, &message))
            .collect();
        if sessions.is_empty() {
            // Wallet approved the session without signing; the post-connect
            // prompt covers it.
            debug!("[ak-05] Wallet returned no auths, keeping the session");
            return Ok(true);
        }

        info!("[ak-05] Authenticated {} sessions via WalletConnect", sessions.len());
        if let Err(e) = config.set_sessions(sessions).await {
            return Err(self.fail_authentication(provider, e).await);
        }

        self.host.set_last_authenticated_network(chain_id);
        self.track(TrackEvent::SiwxAuthSuccess, None);
        Ok(true)
    }

    async fn auth_connector_authenticate(
        &self,
        connector: &dyn AuthConnector,
        chain_id: &CaipNetworkId,
    ) -> Result<AuthConnectResult, SiwxError> {
        let config = match &self.config {
            Some(config) if chain_id.namespace == ChainNamespace::Eip155 => config,
            _ => {
                let request = AuthConnectRequest {
                    chain_id: chain_id.clone(),
                    siwx_message: None,
                };
                return Ok(connector.connect(request).await?);
            }
        };

        let message = config
            .create_message(SiwxInput::new(ACCOUNT_ADDRESS_PLACEHOLDER, chain_id.clone()))
            .await?;
        let serialized_message = message.to_string();
        let mut data = message.into_data();

        let result = connector
            .connect(AuthConnectRequest {
                chain_id: chain_id.clone(),
                siwx_message: Some(SerializedSiwxMessage {
                    data: data.clone(),
                    serialized_message,
                }),
            })
            .await?;

        data.input.account_address = result.address.clone();
        if let (Some(signature), Some(signed)) = (&result.signature, &result.message) {
            self.add_embedded_wallet_session(data, signed.clone(), signature.clone())
                .await?;
        }
        self.host.set_last_authenticated_network(chain_id.clone());

        Ok(result)
    }

    async fn clear_sessions(&self) -> Result<(), SiwxError> {
        match &self.config {
            Some(config) => config.set_sessions(Vec::new()).await,
            None => Ok(()),
        }
    }

    async fn on_disconnect(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError> {
        match &self.config {
            Some(config) if config.sign_out_on_disconnect() => {
                debug!("[ak-05] Revoking session of {} on {}", address, chain_id);
                config.revoke_session(chain_id, address).await
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySiwxConfig;
    use crate::ports::outbound::{HostCall, MockSiwxHost};
    use ak_04_provider_bridge::InMemoryUniversalProvider;
    use appkit_bus::EventFilter;
    use appkit_types::{
        networks, AuthenticateResult, CacaoPayload, CacaoSignature, ProviderError, Session,
    };
    use std::time::Duration;

    fn address() -> CaipAddress {
        CaipAddress::new(ChainNamespace::Eip155, "1", "0xAbC")
    }

    fn mainnet_id() -> CaipNetworkId {
        networks::mainnet().caip_network_id()
    }

    fn host() -> Arc<MockSiwxHost> {
        Arc::new(MockSiwxHost::new(
            Some(address()),
            Some(networks::mainnet()),
            vec![networks::mainnet(), networks::polygon()],
        ))
    }

    fn engine(host: Arc<MockSiwxHost>, config: Arc<InMemorySiwxConfig>) -> (SiwxEngine, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let engine = SiwxEngine::new(host)
            .with_config(config)
            .with_event_bus(Arc::clone(&bus));
        (engine, bus)
    }

    fn config() -> Arc<InMemorySiwxConfig> {
        Arc::new(InMemorySiwxConfig::new("app.example", "https://app.example"))
    }

    fn track_names(bus_events: Vec<AppKitEvent>) -> Vec<&'static str> {
        bus_events
            .into_iter()
            .filter_map(|e| match e {
                AppKitEvent::Track(t) => Some(t.name()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_disabled_engine() {
        let engine = SiwxEngine::new(host());
        assert!(!engine.is_enabled());
        assert!(engine.get_sessions(None, None).await.is_empty());
        assert!(engine.get_all_sessions().await.is_empty());
        assert_eq!(engine.request_sign_message().await, Err(SiwxError::Disabled));
        assert!(engine.clear_sessions().await.is_ok());
    }

    #[tokio::test]
    async fn test_initialize_prompts_without_session() {
        let host = host();
        let (engine, _) = engine(host.clone(), config());

        engine.initialize_if_enabled(Some(&address())).await;
        assert_eq!(host.calls(), vec![HostCall::OpenPrompt]);

        engine.initialize_if_enabled(None).await;
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_request_sign_message_stores_session() {
        let host = host();
        let config = config();
        let (engine, bus) = engine(host.clone(), config.clone());
        let mut events = bus.subscribe(EventFilter::all());

        engine.request_sign_message().await.unwrap();

        let sessions = engine.get_sessions(None, None).await;
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].message.contains("0xAbC"));
        assert_eq!(host.last_authenticated_network(), Some(mainnet_id()));
        assert!(matches!(host.calls()[0], HostCall::Sign(_)));
        assert_eq!(host.calls()[1], HostCall::ClosePrompt);
        assert_eq!(track_names(events.drain()), vec!["SIWX_AUTH_SUCCESS"]);

        engine.initialize_if_enabled(Some(&address())).await;
        assert!(!host.calls().contains(&HostCall::OpenPrompt));
    }

    #[tokio::test]
    async fn test_request_sign_message_failure_reopens_prompt() {
        let host = Arc::new(
            MockSiwxHost::new(Some(address()), Some(networks::mainnet()), vec![networks::mainnet()])
                .with_sign_error(ProviderError::Rejected { code: 4001, message: "User rejected".into() }),
        );
        let (engine, bus) = engine(host.clone(), config());
        let mut events = bus.subscribe(EventFilter::all());

        // Signing failures are reported through the prompt, not the caller.
        engine.request_sign_message().await.unwrap();
        assert!(host.is_prompt_open());
        assert!(engine.get_sessions(None, None).await.is_empty());

        let events = events.drain();
        let AppKitEvent::Track(TrackEvent::SiwxAuthError(props)) = &events[0] else {
            panic!("expected auth error, got {events:?}");
        };
        assert_eq!(props.network, "eip155:1");
        assert!(props.message.as_deref().unwrap().contains("User rejected"));
    }

    #[tokio::test]
    async fn test_request_sign_message_without_address() {
        let host = Arc::new(MockSiwxHost::new(None, Some(networks::mainnet()), vec![]));
        let (engine, bus) = engine(host.clone(), config());
        let mut events = bus.subscribe(EventFilter::all());

        assert_eq!(engine.request_sign_message().await, Err(SiwxError::NoActiveAddress));
        assert!(host.calls().is_empty());
        assert!(track_names(events.drain()).is_empty());

        let host = Arc::new(MockSiwxHost::new(Some(address()), None, vec![]));
        let (engine, _) = self::engine(host, config());
        assert_eq!(engine.request_sign_message().await, Err(SiwxError::NoActiveNetwork));
    }

    #[tokio::test]
    async fn test_request_sign_message_swallows_config_failure() {
        let host = host();
        let config = Arc::new(
            InMemorySiwxConfig::new("app.example", "https://app.example")
                .with_expiration(chrono::Duration::days(100_000_000)),
        );
        let (engine, bus) = engine(host.clone(), config.clone());
        let mut events = bus.subscribe(EventFilter::all());

        assert!(engine.request_sign_message().await.is_ok());
        assert_eq!(config.session_count(), 0);
        assert!(host.is_prompt_open());
        assert_eq!(host.last_authenticated_network(), None);
        assert_eq!(track_names(events.drain()), vec!["SIWX_AUTH_ERROR"]);
    }

    #[tokio::test]
    async fn test_cancel_optional_only_closes() {
        let host = host();
        let (engine, bus) = engine(host.clone(), config());
        let mut events = bus.subscribe(EventFilter::all());

        engine.cancel_sign_message().await.unwrap();
        assert_eq!(host.calls(), vec![HostCall::ClosePrompt]);
        assert_eq!(track_names(events.drain()), vec!["CLICK_CANCEL_SIWX"]);
    }

    #[tokio::test]
    async fn test_cancel_required_disconnects_without_session() {
        let host = host();
        let config = Arc::new(
            InMemorySiwxConfig::new("app.example", "https://app.example").with_required(true),
        );
        let (engine, _) = engine(host.clone(), config);

        assert!(engine.is_close_disabled().await);
        engine.cancel_sign_message().await.unwrap();
        assert_eq!(host.calls(), vec![HostCall::Disconnect, HostCall::ClosePrompt]);
    }

    #[tokio::test]
    async fn test_cancel_required_disconnect_failure_still_closes() {
        let host = Arc::new(
            MockSiwxHost::new(Some(address()), Some(networks::mainnet()), vec![networks::mainnet()])
                .with_disconnect_error(ProviderError::Request("socket closed".into())),
        );
        let config = Arc::new(
            InMemorySiwxConfig::new("app.example", "https://app.example").with_required(true),
        );
        let (engine, bus) = engine(host.clone(), config);
        let mut events = bus.subscribe(EventFilter::all());

        assert!(engine.cancel_sign_message().await.is_ok());
        assert_eq!(host.calls(), vec![HostCall::Disconnect, HostCall::ClosePrompt]);
        assert_eq!(track_names(events.drain()), vec!["CLICK_CANCEL_SIWX"]);
    }

    #[tokio::test]
    async fn test_cancel_required_switches_to_last_authenticated_network() {
        let host = host();
        let config = Arc::new(
            InMemorySiwxConfig::new("app.example", "https://app.example").with_required(true),
        );
        let (engine, _) = engine(host.clone(), config);

        engine.request_sign_message().await.unwrap();
        assert!(!engine.is_close_disabled().await);
        host.set_last_authenticated_network(networks::polygon().caip_network_id());
        host.set_last_authenticated_network(mainnet_id());

        engine.cancel_sign_message().await.unwrap();
        assert!(host
            .calls()
            .contains(&HostCall::SwitchNetwork(mainnet_id())));
        assert!(!host.calls().contains(&HostCall::Disconnect));
    }

    #[tokio::test]
    async fn test_get_all_sessions_spans_networks() {
        let host = host();
        let config = config();
        let (engine, _) = engine(host, config.clone());

        for chain in [mainnet_id(), networks::polygon().caip_network_id()] {
            let message = config
                .create_message(SiwxInput::new("0xabc", chain))
                .await
                .unwrap();
            config
                .add_session(SiwxSession::new(message.data().clone(), message.to_string(), "0xsig"))
                .await
                .unwrap();
        }

        assert_eq!(engine.get_all_sessions().await.len(), 2);
        engine.clear_sessions().await.unwrap();
        assert!(engine.get_all_sessions().await.is_empty());
    }

    struct SlowConfig {
        inner: InMemorySiwxConfig,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl SlowConfig {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: InMemorySiwxConfig::new("app.example", "https://app.example"),
                writes: std::sync::atomic::AtomicUsize::new(0),
            })
        }

        fn writes(&self) -> usize {
            self.writes.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SiwxConfig for SlowConfig {
        async fn create_message(&self, input: SiwxInput) -> Result<SiwxMessage, SiwxError> {
            self.inner.create_message(input).await
        }

        async fn add_session(&self, session: SiwxSession) -> Result<(), SiwxError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.add_session(session).await?;
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn revoke_session(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError> {
            self.inner.revoke_session(chain_id, address).await
        }

        async fn set_sessions(&self, sessions: Vec<SiwxSession>) -> Result<(), SiwxError> {
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

    #[tokio::test]
    async fn test_single_in_flight_session_write() {
        let config = SlowConfig::new();
        let engine = SiwxEngine::new(host()).with_config(config.clone());
        let message = config
            .create_message(SiwxInput::new("0xabc", mainnet_id()))
            .await
            .unwrap();

        let (a, b) = futures::join!(
            engine.add_embedded_wallet_session(message.data().clone(), message.to_string(), "0xsig1".into()),
            engine.add_embedded_wallet_session(message.data().clone(), message.to_string(), "0xsig2".into()),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(config.inner.session_count(), 1);

        engine
            .add_embedded_wallet_session(message.data().clone(), message.to_string(), "0xsig3".into())
            .await
            .unwrap();
        assert_eq!(config.inner.session_count(), 2);
        assert!(engine.in_flight.lock().is_none());
    }

    #[tokio::test]
    async fn test_abandoned_session_write_frees_slot() {
        let config = SlowConfig::new();
        let engine = SiwxEngine::new(host()).with_config(config.clone());
        let message = config
            .create_message(SiwxInput::new("0xabc", mainnet_id()))
            .await
            .unwrap();
        async fn add(engine: &SiwxEngine, message: &SiwxMessage, signature: &str) -> Result<(), SiwxError> {
            engine
                .add_embedded_wallet_session(message.data().clone(), message.to_string(), signature.into())
                .await
        }

        // Caller gives up while the write is still sleeping.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), add(&engine, &message, "0xsig1")).await;
        assert!(abandoned.is_err());
        assert!(engine.in_flight.lock().is_some());

        // The next caller drives the pending write to completion.
        add(&engine, &message, "0xsig2").await.unwrap();
        assert_eq!(config.writes(), 1);
        assert!(engine.in_flight.lock().is_none());

        // Later calls write their own session instead of replaying it.
        add(&engine, &message, "0xsig3").await.unwrap();
        add(&engine, &message, "0xsig4").await.unwrap();
        assert_eq!(config.writes(), 3);
        assert_eq!(config.inner.session_count(), 3);
        assert!(engine.in_flight.lock().is_none());
    }

    fn cacao(iss: &str) -> Cacao {
        Cacao {
            p: CacaoPayload {
                domain: "app.example".into(),
                aud: "https://app.example".into(),
                nonce: "n".into(),
                iss: iss.into(),
                iat: Some("2026-01-01T00:00:00Z".into()),
                ..Default::default()
            },
            s: CacaoSignature {
                t: "eip191".into(),
                s: "0xcacaosig".into(),
                m: None,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_universal_provider_authenticate() {
        let host = host();
        let config = config();
        let (engine, bus) = engine(host.clone(), config.clone());
        let mut events = bus.subscribe(EventFilter::all());
        let provider = InMemoryUniversalProvider::new();
        provider.script_authenticate(Ok(AuthenticateResult {
            session: Session::default(),
            auths: vec![cacao("did:pkh:eip155:137:0xDeF"), cacao("did:pkh:bogus")],
        }));

        let chains = [networks::polygon().caip_network_id(), mainnet_id()];
        let authenticated = engine
            .universal_provider_authenticate(&provider, &chains, &["personal_sign".to_string()])
            .await
            .unwrap();
        assert!(authenticated);

        let params = &provider.authenticate_calls()[0];
        assert_eq!(params.chain_id, "eip155:1");
        assert_eq!(params.chains, vec!["eip155:1", "eip155:137"]);
        assert_eq!(params.domain, "app.example");

        let sessions = config
            .get_sessions(&networks::polygon().caip_network_id(), "0xdef")
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].signature, "0xcacaosig");
        assert_eq!(sessions[0].data.metadata.version, "1");
        assert!(sessions[0].message.starts_with("app.example wants you to sign in"));
        assert_eq!(track_names(events.drain()), vec!["SIWX_AUTH_SUCCESS"]);
    }

    #[tokio::test]
    async fn test_universal_provider_authenticate_not_applicable() {
        let (engine, _) = engine(host(), config());
        let provider = InMemoryUniversalProvider::new();

        let mixed = [mainnet_id(), networks::solana().caip_network_id()];
        assert!(!engine
            .universal_provider_authenticate(&provider, &mixed, &[])
            .await
            .unwrap());
        assert!(!engine
            .universal_provider_authenticate(&provider, &[], &[])
            .await
            .unwrap());
        assert!(provider.authenticate_calls().is_empty());
    }

    #[tokio::test]
    async fn test_universal_provider_authenticate_failure_propagates() {
        let (engine, bus) = engine(host(), config());
        let mut events = bus.subscribe(EventFilter::all());
        let provider = InMemoryUniversalProvider::new();
        provider.set_session(Some(Session::default()));
        provider.script_authenticate(Err(ProviderError::Rejected {
            code: 5000,
            message: "User rejected".into(),
        }));

        let result = engine
            .universal_provider_authenticate(&provider, &[mainnet_id()], &[])
            .await;
        assert!(matches!(result, Err(SiwxError::Provider(e)) if e.is_user_rejected()));
        // Rejection is the caller's to handle; the transport is left alone.
        assert!(provider.session().is_some());
        assert_eq!(track_names(events.drain()), vec!["SIWX_AUTH_ERROR"]);
    }

    #[tokio::test]
    async fn test_universal_provider_authenticate_without_auths_keeps_session() {
        let host = host();
        let config = config();
        let (engine, bus) = engine(host.clone(), config.clone());
        let mut events = bus.subscribe(EventFilter::all());
        let provider = InMemoryUniversalProvider::new();
        provider.script_authenticate(Ok(AuthenticateResult {
            session: Session::default(),
            auths: vec![],
        }));

        let authenticated = engine
            .universal_provider_authenticate(&provider, &[mainnet_id()], &[])
            .await
            .unwrap();
        assert!(authenticated);
        assert!(provider.session().is_some());
        assert_eq!(config.session_count(), 0);
        assert_eq!(host.last_authenticated_network(), None);
        assert!(track_names(events.drain()).is_empty());

        // Sessions are still missing, so the post-connect prompt opens.
        engine.initialize_if_enabled(Some(&address())).await;
        assert!(host.calls().contains(&HostCall::OpenPrompt));
    }

    struct EmbeddedWallet;

    #[async_trait]
    impl AuthConnector for EmbeddedWallet {
        async fn connect(&self, request: AuthConnectRequest) -> Result<AuthConnectResult, ProviderError> {
            let message = request.siwx_message.map(|m| {
                m.serialized_message
                    .replace(ACCOUNT_ADDRESS_PLACEHOLDER, "0xEmbedded")
            });
            Ok(AuthConnectResult {
                address: "0xEmbedded".into(),
                chain_id: Some(request.chain_id.reference),
                signature: message.as_ref().map(|_| "0xembsig".to_string()),
                message,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_auth_connector_authenticate() {
        let host = host();
        let config = config();
        let (engine, _) = engine(host.clone(), config.clone());

        let result = engine
            .auth_connector_authenticate(&EmbeddedWallet, &mainnet_id())
            .await
            .unwrap();
        assert_eq!(result.address, "0xEmbedded");

        let sessions = config.get_sessions(&mainnet_id(), "0xembedded").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].message.contains("0xEmbedded"));
        assert_eq!(sessions[0].data.input.account_address, "0xEmbedded");
        assert_eq!(host.last_authenticated_network(), Some(mainnet_id()));
    }

    #[tokio::test]
    async fn test_auth_connector_without_siwx_on_solana() {
        let (engine, _) = engine(host(), config());
        let result = engine
            .auth_connector_authenticate(&EmbeddedWallet, &networks::solana().caip_network_id())
            .await
            .unwrap();
        assert!(result.signature.is_none());
    }

    #[tokio::test]
    async fn test_on_disconnect_revokes() {
        let config = config();
        let (engine, _) = engine(host(), config.clone());
        engine.request_sign_message().await.unwrap();
        assert_eq!(config.session_count(), 1);

        engine.on_disconnect(&mainnet_id(), "0xabc").await.unwrap();
        assert_eq!(config.session_count(), 0);

        let keep = Arc::new(
            InMemorySiwxConfig::new("app.example", "https://app.example")
                .with_sign_out_on_disconnect(false),
        );
        let (engine, _) = engine_with(keep.clone());
        engine.request_sign_message().await.unwrap();
        engine.on_disconnect(&mainnet_id(), "0xabc").await.unwrap();
        assert_eq!(keep.session_count(), 1);
    }

    fn engine_with(config: Arc<InMemorySiwxConfig>) -> (SiwxEngine, Arc<InMemoryEventBus>) {
        engine(host(), config)
    }
}
