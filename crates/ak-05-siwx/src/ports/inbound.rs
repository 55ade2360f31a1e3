//! # Inbound Ports
//!
//! API trait defining what the SIWX engine can do.

use crate::domain::{SiwxError, SiwxMessageData, SiwxSession};
use crate::ports::outbound::{AuthConnectResult, AuthConnector};
use appkit_types::{CaipAddress, CaipNetworkId, UniversalProvider};
use async_trait::async_trait;

/// SIWX engine API - inbound port.
#[async_trait]
pub trait SiwxEngineApi: Send + Sync {
    /// Whether a SIWX config is installed.
    fn is_enabled(&self) -> bool;

    /// After a connect: prompt for a signature unless a session exists.
    async fn initialize_if_enabled(&self, caip_address: Option<&CaipAddress>);

    /// Sign the challenge with the active wallet and store the session.
    ///
    /// Errors only without config, active address or active network;
    /// later failures reopen the prompt and publish `SIWX_AUTH_ERROR`.
    async fn request_sign_message(&self) -> Result<(), SiwxError>;

    /// The user dismissed the prompt. Switch and disconnect failures are
    /// logged; the prompt always closes.
    async fn cancel_sign_message(&self) -> Result<(), SiwxError>;

    /// Sessions of `address` on `chain_id`, defaulting to the active ones.
    async fn get_sessions(
        &self,
        chain_id: Option<&CaipNetworkId>,
        address: Option<&str>,
    ) -> Vec<SiwxSession>;

    /// Sessions of the active address over every requested network.
    async fn get_all_sessions(&self) -> Vec<SiwxSession>;

    /// Whether the prompt must stay open.
    async fn is_close_disabled(&self) -> bool;

    /// Store a session signed by the embedded wallet.
    async fn add_embedded_wallet_session(
        &self,
        data: SiwxMessageData,
        message: String,
        signature: String,
    ) -> Result<(), SiwxError>;

    /// Sign in during a WalletConnect `authenticate` round-trip. Returns
    /// `false` when the request does not qualify.
    async fn universal_provider_authenticate(
        &self,
        provider: &dyn UniversalProvider,
        chains: &[CaipNetworkId],
        methods: &[String],
    ) -> Result<bool, SiwxError>;

    /// Connect the embedded wallet, signing in within the same call.
    async fn auth_connector_authenticate(
        &self,
        connector: &dyn AuthConnector,
        chain_id: &CaipNetworkId,
    ) -> Result<AuthConnectResult, SiwxError>;

    /// Drop every session.
    async fn clear_sessions(&self) -> Result<(), SiwxError>;

    /// A wallet disconnected.
    async fn on_disconnect(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError>;
}
