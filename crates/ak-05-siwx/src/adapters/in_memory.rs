//! # In-Memory SIWX Config
//!
//! Stores sessions per `(chain, lowercase address)` in process memory.
//! Expired sessions are never returned.

use crate::domain::{
    SiwxError, SiwxIdentifier, SiwxInput, SiwxMessage, SiwxMessageData, SiwxMetadata, SiwxSession,
};
use crate::ports::outbound::SiwxConfig;
use appkit_types::CaipNetworkId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

const NONCE_LENGTH: usize = 16;

type SessionKey = (CaipNetworkId, String);

fn session_key(chain_id: &CaipNetworkId, address: &str) -> SessionKey {
    (chain_id.clone(), address.to_lowercase())
}

fn is_expired(session: &SiwxSession, now: DateTime<Utc>) -> bool {
    session
        .data
        .identifier
        .expiration_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .is_some_and(|expires| expires.with_timezone(&Utc) <= now)
}

/// In-memory SIWX config.
pub struct InMemorySiwxConfig {
    domain: String,
    uri: String,
    statement: Option<String>,
    expiration: Option<Duration>,
    required: bool,
    sign_out_on_disconnect: bool,
    sessions: RwLock<HashMap<SessionKey, Vec<SiwxSession>>>,
}

impl InMemorySiwxConfig {
    /// Config for `domain` and `uri`. Sessions are optional and revoked
    /// on disconnect.
    pub fn new(domain: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            uri: uri.into(),
            statement: None,
            expiration: None,
            required: false,
            sign_out_on_disconnect: true,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Statement shown in messages.
    #[must_use]
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    /// Sessions expire `expiration` after issuance.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Require a session to stay connected.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Keep or revoke sessions on disconnect.
    #[must_use]
    pub fn with_sign_out_on_disconnect(mut self, sign_out: bool) -> Self {
        self.sign_out_on_disconnect = sign_out;
        self
    }

    /// Number of stored sessions, expired ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.read().values().map(Vec::len).sum()
    }

    fn generate_nonce() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl SiwxConfig for InMemorySiwxConfig {
    async fn create_message(&self, input: SiwxInput) -> Result<SiwxMessage, SiwxError> {
        let now = Utc::now();
        let expiration_time = match self.expiration {
            Some(expiration) => Some(
                now.checked_add_signed(expiration)
                    .ok_or_else(|| SiwxError::Config("Session expiration out of range".to_string()))?
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            None => None,
        };
        let data = SiwxMessageData {
            input,
            metadata: SiwxMetadata {
                domain: self.domain.clone(),
                uri: self.uri.clone(),
                version: "1".to_string(),
                nonce: Self::generate_nonce(),
                statement: self.statement.clone(),
                resources: None,
            },
            identifier: SiwxIdentifier {
                request_id: Some(uuid::Uuid::new_v4().to_string()),
                issued_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                expiration_time,
            },
        };
        Ok(SiwxMessage::new(data))
    }

    async fn add_session(&self, session: SiwxSession) -> Result<(), SiwxError> {
        if session.signature.is_empty() || session.data.input.account_address.is_empty() {
            return Err(SiwxError::Config("Invalid session".to_string()));
        }
        let key = session_key(&session.data.input.chain_id, &session.data.input.account_address);
        debug!("[ak-05] Storing session for {}:{}", key.0, key.1);
        self.sessions.write().entry(key).or_default().push(session);
        Ok(())
    }

    async fn revoke_session(&self, chain_id: &CaipNetworkId, address: &str) -> Result<(), SiwxError> {
        self.sessions.write().remove(&session_key(chain_id, address));
        Ok(())
    }

    async fn set_sessions(&self, sessions: Vec<SiwxSession>) -> Result<(), SiwxError> {
        let mut stored: HashMap<SessionKey, Vec<SiwxSession>> = HashMap::new();
        for session in sessions {
            let key = session_key(&session.data.input.chain_id, &session.data.input.account_address);
            stored.insert(key, vec![session]);
        }
        *self.sessions.write() = stored;
        Ok(())
    }

    async fn get_sessions(
        &self,
        chain_id: &CaipNetworkId,
        address: &str,
    ) -> Result<Vec<SiwxSession>, SiwxError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .get(&session_key(chain_id, address))
            .map(|sessions| {
                sessions
                    .iter()
                    .filter(|s| !is_expired(s, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_required(&self) -> bool {
        self.required
    }

    fn sign_out_on_disconnect(&self) -> bool {
        self.sign_out_on_disconnect
    }
}
