//! # Error Types
//!
//! Defines error types used across subsystems.

use serde_json::Value;
use thiserror::Error;

/// JSON-RPC code returned by WalletConnect wallets when the user rejects.
pub const USER_REJECTED_CODE: i64 = 5000;

/// JSON-RPC code returned when the user rejects the requested methods.
pub const USER_REJECTED_METHODS_CODE: i64 = 5002;

/// EIP-1193 user rejection code used by injected providers.
pub const EIP1193_USER_REJECTED_CODE: i64 = 4001;

/// Malformed CAIP identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a `namespace:reference` string.
    #[error("Invalid CAIP network id: {0}")]
    InvalidNetworkId(String),

    /// Not a `namespace:reference:address` string.
    #[error("Invalid CAIP address: {0}")]
    InvalidAddress(String),
}

/// A wallet or provider rejected or failed a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The wallet answered with an RPC error.
    #[error("Provider rejected request ({code}): {message}")]
    Rejected {
        /// RPC error code.
        code: i64,
        /// Human-readable message.
        message: String,
    },

    /// Transport or provider failure without a structured code.
    #[error("Provider request failed: {0}")]
    Request(String),

    /// The provider does not implement the capability.
    #[error("Provider does not support {0}")]
    Unsupported(String),

    /// No WalletConnect session is established.
    #[error("No active session")]
    NoSession,
}

impl ProviderError {
    /// Build an error from an arbitrary error payload.
    ///
    /// Underlying providers may throw anything: an object carrying
    /// `code`/`message`, a bare string, or something else entirely.
    pub fn from_unknown(payload: &Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let message = parse_error_message(payload);

        match code {
            Some(code) => Self::Rejected { code, message },
            None => Self::Request(message),
        }
    }

    /// True when the wallet user explicitly rejected the request.
    pub fn is_user_rejected(&self) -> bool {
        matches!(
            self,
            Self::Rejected { code, .. }
                if *code == USER_REJECTED_CODE
                    || *code == USER_REJECTED_METHODS_CODE
                    || *code == EIP1193_USER_REJECTED_CODE
        )
    }
}

/// Extract a readable message from an unknown error payload.
pub fn parse_error_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => payload.to_string(),
        },
        Value::Null => "Unknown error".to_string(),
        other => other.to_string(),
    }
}
