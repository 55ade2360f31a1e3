//! # Outbound Ports
//!
//! Dependencies of the SIWX engine: the session store, the application
//! host and the embedded-auth connector.

use crate::domain::{SiwxError, SiwxInput, SiwxMessage, SiwxMessageData, SiwxSession};
use appkit_types::{Account, CaipAddress, CaipNetwork, CaipNetworkId, ProviderError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Pluggable SIWX session policy and storage.
#[async_trait]
pub trait SiwxConfig: Send + Sync {
    /// Build the challenge for `input`.
    async fn create_message(&self, input: SiwxInput) -> Result<SiwxMessage, SiwxError>;

    /// Verify and store a session.
    async fn add_session(&self, session: SiwxSession) -> Result<(), SiwxError>;

    /// Drop the sessions of `address` on `chain_id`.
    async fn revoke_session(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError>;

    /// Replace every stored session.
    async fn set_sessions(&self, sessions: Vec<SiwxSession>) -> Result<(), SiwxError>;

    /// Valid sessions of `address` on `chain_id`.
    async fn get_sessions(
        &self,
        chain_id: &CaipNetworkId,
        address: &str,
    ) -> Result<Vec<SiwxSession>, SiwxError>;

    /// Whether a session is mandatory to stay connected.
    fn get_required(&self) -> bool {
        false
    }

    /// Whether disconnecting revokes the session.
    fn sign_out_on_disconnect(&self) -> bool {
        true
    }
}

/// Application state and UI the engine drives.
#[async_trait]
pub trait SiwxHost: Send + Sync {
    /// Connected account.
    fn active_caip_address(&self) -> Option<CaipAddress>;

    /// Active network.
    fn active_caip_network(&self) -> Option<CaipNetwork>;

    /// Networks the application requested.
    fn requested_networks(&self) -> Vec<CaipNetwork>;

    /// Whether SIWX can run on `network`.
    fn is_network_supported(&self, network: &CaipNetworkId) -> bool {
        self.requested_networks()
            .iter()
            .any(|n| &n.caip_network_id() == network)
    }

    /// Whether the connected account is a smart account.
    fn is_smart_account(&self) -> bool {
        false
    }

    /// Sign with the active wallet.
    async fn sign_message(&self, message: &str) -> Result<String, ProviderError>;

    /// Disconnect the active wallet.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Switch the active network.
    async fn switch_network(&self, network: &CaipNetwork) -> Result<(), ProviderError>;

    /// Show the sign-message prompt.
    fn open_prompt(&self);

    /// Hide the sign-message prompt.
    fn close_prompt(&self);

    /// Whether the prompt is shown.
    fn is_prompt_open(&self) -> bool;

    /// Return the UI to the connect screen.
    fn reset_to_connect(&self) {}

    /// Network of the last successful sign-in.
    fn last_authenticated_network(&self) -> Option<CaipNetworkId>;

    /// Record the network of a successful sign-in.
    fn set_last_authenticated_network(&self, network: CaipNetworkId);
}

/// Message forwarded to the embedded-auth connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedSiwxMessage {
    /// Message fields.
    pub data: SiwxMessageData,
    /// Rendered message.
    pub serialized_message: String,
}

/// Connect request for the embedded-auth connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConnectRequest {
    /// Chain to connect on.
    pub chain_id: CaipNetworkId,
    /// Challenge to sign during connect.
    pub siwx_message: Option<SerializedSiwxMessage>,
}

/// Connect result of the embedded-auth connector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthConnectResult {
    /// Connected address.
    pub address: String,
    /// Connected chain reference.
    pub chain_id: Option<String>,
    /// Accounts of the embedded wallet.
    pub accounts: Vec<Account>,
    /// Signature over `message`, when a challenge was signed.
    pub signature: Option<String>,
    /// Signed message text.
    pub message: Option<String>,
}

/// Embedded email/social wallet.
#[async_trait]
pub trait AuthConnector: Send + Sync {
    /// Connect, optionally signing a challenge in the same round-trip.
    async fn connect(&self, request: AuthConnectRequest) -> Result<AuthConnectResult, ProviderError>;
}

// =============================================================================
// MOCKS
// =============================================================================

/// Calls recorded by [`MockSiwxHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    /// `sign_message`
    Sign(String),
    /// `disconnect`
    Disconnect,
    /// `switch_network`
    SwitchNetwork(CaipNetworkId),
    /// `open_prompt`
    OpenPrompt,
    /// `close_prompt`
    ClosePrompt,
    /// `reset_to_connect`
    ResetToConnect,
}

/// Mock host for testing.
#[derive(Default)]
pub struct MockSiwxHost {
    address: Mutex<Option<CaipAddress>>,
    network: Mutex<Option<CaipNetwork>>,
    networks: Vec<CaipNetwork>,
    last_network: Mutex<Option<CaipNetworkId>>,
    prompt_open: AtomicBool,
    sign_error: Option<ProviderError>,
    disconnect_error: Option<ProviderError>,
    calls: Mutex<Vec<HostCall>>,
}

impl MockSiwxHost {
    /// Host connected with `address` on `network`, requesting `networks`.
    pub fn new(address: Option<CaipAddress>, network: Option<CaipNetwork>, networks: Vec<CaipNetwork>) -> Self {
        Self {
            address: Mutex::new(address),
            network: Mutex::new(network),
            networks,
            ..Default::default()
        }
    }

    /// Fail `sign_message` with `error`.
    #[must_use]
    pub fn with_sign_error(mut self, error: ProviderError) -> Self {
        self.sign_error = Some(error);
        self
    }

    /// Fail `disconnect` with `error`.
    #[must_use]
    pub fn with_disconnect_error(mut self, error: ProviderError) -> Self {
        self.disconnect_error = Some(error);
        self
    }

    /// Recorded calls.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Change the active account.
    pub fn set_address(&self, address: Option<CaipAddress>) {
        *self.address.lock() = address;
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl SiwxHost for MockSiwxHost {
    fn active_caip_address(&self) -> Option<CaipAddress> {
        self.address.lock().clone()
    }

    fn active_caip_network(&self) -> Option<CaipNetwork> {
        self.network.lock().clone()
    }

    fn requested_networks(&self) -> Vec<CaipNetwork> {
        self.networks.clone()
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        self.record(HostCall::Sign(message.to_string()));
        match &self.sign_error {
            Some(error) => Err(error.clone()),
            None => Ok(format!("0xsig{}", message.len())),
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.record(HostCall::Disconnect);
        if let Some(error) = &self.disconnect_error {
            return Err(error.clone());
        }
        *self.address.lock() = None;
        Ok(())
    }

    async fn switch_network(&self, network: &CaipNetwork) -> Result<(), ProviderError> {
        self.record(HostCall::SwitchNetwork(network.caip_network_id()));
        *self.network.lock() = Some(network.clone());
        Ok(())
    }

    fn open_prompt(&self) {
        self.prompt_open.store(true, Ordering::SeqCst);
        self.record(HostCall::OpenPrompt);
    }

    fn close_prompt(&self) {
        self.prompt_open.store(false, Ordering::SeqCst);
        self.record(HostCall::ClosePrompt);
    }

    fn is_prompt_open(&self) -> bool {
        self.prompt_open.load(Ordering::SeqCst)
    }

    fn reset_to_connect(&self) {
        self.record(HostCall::ResetToConnect);
    }

    fn last_authenticated_network(&self) -> Option<CaipNetworkId> {
        self.last_network.lock().clone()
    }

    fn set_last_authenticated_network(&self, network: CaipNetworkId) {
        *self.last_network.lock() = Some(network);
    }
}
