//! # In-Memory Universal Provider
//!
//! Process-local [`UniversalProvider`] with scripted results. Events are
//! only produced by [`emit`](InMemoryUniversalProvider::emit) and by
//! `connect`/`authenticate`/`disconnect`.

use appkit_types::{
    AuthenticateParams, AuthenticateResult, ChainNamespace, EventHandler, ListenerId,
    NamespaceConfig, ProviderError, ProviderEvent, ProviderEventKind, Session, UniversalProvider,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory universal provider for testing.
pub struct InMemoryUniversalProvider {
    session: RwLock<Option<Session>>,
    default_chains: RwLock<HashMap<ChainNamespace, String>>,
    listeners: Mutex<Vec<(ListenerId, ProviderEventKind, EventHandler)>>,
    next_listener: AtomicU64,
    connect_result: Mutex<Option<Result<Session, ProviderError>>>,
    authenticate_result: Mutex<Option<Result<AuthenticateResult, ProviderError>>>,
    authenticate_calls: Mutex<Vec<AuthenticateParams>>,
    connect_calls: Mutex<Vec<NamespaceConfig>>,
    responses: RwLock<HashMap<String, Value>>,
}

impl InMemoryUniversalProvider {
    /// Provider without a session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
            default_chains: RwLock::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            connect_result: Mutex::new(None),
            authenticate_result: Mutex::new(None),
            authenticate_calls: Mutex::new(Vec::new()),
            connect_calls: Mutex::new(Vec::new()),
            responses: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the established session.
    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    /// Set the default chain reference of a namespace.
    pub fn set_default_chain(&self, namespace: ChainNamespace, reference: impl Into<String>) {
        self.default_chains.write().insert(namespace, reference.into());
    }

    /// Result of the next `connect` calls.
    pub fn script_connect(&self, result: Result<Session, ProviderError>) {
        *self.connect_result.lock() = Some(result);
    }

    /// Result of the next `authenticate` calls.
    pub fn script_authenticate(&self, result: Result<AuthenticateResult, ProviderError>) {
        *self.authenticate_result.lock() = Some(result);
    }

    /// Response to `method` requests.
    pub fn script_response(&self, method: &str, response: Value) {
        self.responses.write().insert(method.to_string(), response);
    }

    /// Parameters of every `authenticate` call.
    pub fn authenticate_calls(&self) -> Vec<AuthenticateParams> {
        self.authenticate_calls.lock().clone()
    }

    /// Namespaces of every `connect` call.
    pub fn connect_calls(&self) -> Vec<NamespaceConfig> {
        self.connect_calls.lock().clone()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Dispatch `event` to the listeners of its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| h.clone())
            .collect();

        for handler in handlers {
            handler(&event);
        }
    }
}

impl Default for InMemoryUniversalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UniversalProvider for InMemoryUniversalProvider {
    fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn default_chain(&self, namespace: &ChainNamespace) -> Option<String> {
        self.default_chains.read().get(namespace).cloned()
    }

    fn on(&self, kind: ProviderEventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, kind, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(l, _, _)| *l != id);
    }

    async fn connect(&self, namespaces: &NamespaceConfig) -> Result<Session, ProviderError> {
        self.connect_calls.lock().push(namespaces.clone());
        let result = self
            .connect_result
            .lock()
            .clone()
            .unwrap_or(Err(ProviderError::NoSession))?;
        self.set_session(Some(result.clone()));
        self.emit(ProviderEvent::Connect);
        Ok(result)
    }

    async fn authenticate(
        &self,
        params: &AuthenticateParams,
    ) -> Result<AuthenticateResult, ProviderError> {
        self.authenticate_calls.lock().push(params.clone());
        let result = self
            .authenticate_result
            .lock()
            .clone()
            .unwrap_or_else(|| Err(ProviderError::Unsupported("wc_sessionAuthenticate".into())))?;
        self.set_session(Some(result.session.clone()));
        self.emit(ProviderEvent::Connect);
        Ok(result)
    }

    async fn request(
        &self,
        method: &str,
        _params: Value,
        _chain_id: Option<&str>,
    ) -> Result<Value, ProviderError> {
        if self.session.read().is_none() {
            return Err(ProviderError::NoSession);
        }
        self.responses
            .read()
            .get(method)
            .cloned()
            .ok_or_else(|| ProviderError::Unsupported(method.to_string()))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.set_session(None);
        self.emit(ProviderEvent::Disconnect);
        Ok(())
    }
}
