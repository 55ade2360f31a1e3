//! # SIWX Sessions

use crate::domain::message::SiwxMessageData;
use appkit_types::Cacao;
use serde::{Deserialize, Serialize};

/// A signed-in session for one account on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwxSession {
    /// Fields of the signed message.
    pub data: SiwxMessageData,
    /// The exact text that was signed.
    pub message: String,
    /// Wallet signature over `message`.
    pub signature: String,
    /// Signed auth object, for protocol-level authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacao: Option<Cacao>,
}

impl SiwxSession {
    /// Session from a signed message.
    pub fn new(data: SiwxMessageData, message: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            signature: signature.into(),
            cacao: None,
        }
    }

    /// Lowercased signing address.
    pub fn address_key(&self) -> String {
        self.data.input.account_address.to_lowercase()
    }
}
