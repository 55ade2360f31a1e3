//! # SIWX Messages
//!
//! The challenge a wallet signs. [`SiwxMessage`] renders an informal
//! CAIP-122 layout through `Display`.

use appkit_types::{CaipNetworkId, ChainNamespace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Placeholder for an address that is only known after signing.
pub const ACCOUNT_ADDRESS_PLACEHOLDER: &str = "<<AccountAddress>>";

/// Caller-supplied part of a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwxInput {
    /// Signing account.
    pub account_address: String,
    /// Chain the session is for.
    pub chain_id: CaipNetworkId,
    /// Not valid before (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
}

impl SiwxInput {
    /// Input for `account_address` on `chain_id`.
    pub fn new(account_address: impl Into<String>, chain_id: CaipNetworkId) -> Self {
        Self {
            account_address: account_address.into(),
            chain_id,
            not_before: None,
        }
    }
}

/// Config-supplied part of a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwxMetadata {
    /// Requesting domain.
    pub domain: String,
    /// Requesting URI.
    pub uri: String,
    /// Message version.
    pub version: String,
    /// Challenge nonce.
    pub nonce: String,
    /// Human-readable statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    /// Resource URIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
}

/// Optional identifying fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwxIdentifier {
    /// Request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Issued at (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// Expires at (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
}

/// Every field of a message, serialized flat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiwxMessageData {
    /// Input fields.
    #[serde(flatten)]
    pub input: SiwxInput,
    /// Metadata fields.
    #[serde(flatten)]
    pub metadata: SiwxMetadata,
    /// Identifier fields.
    #[serde(flatten)]
    pub identifier: SiwxIdentifier,
}

/// A message ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiwxMessage {
    data: SiwxMessageData,
}

impl SiwxMessage {
    /// Wrap message data.
    pub fn new(data: SiwxMessageData) -> Self {
        Self { data }
    }

    /// The message fields.
    pub fn data(&self) -> &SiwxMessageData {
        &self.data
    }

    /// Take the message fields.
    pub fn into_data(self) -> SiwxMessageData {
        self.data
    }
}

impl Deref for SiwxMessage {
    type Target = SiwxMessageData;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl From<SiwxMessageData> for SiwxMessage {
    fn from(data: SiwxMessageData) -> Self {
        Self::new(data)
    }
}

impl fmt::Display for SiwxMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SiwxMessageData {
            input,
            metadata,
            identifier,
        } = &self.data;

        writeln!(
            f,
            "{} wants you to sign in with your {} account:",
            metadata.domain,
            input.chain_id.namespace.display_name()
        )?;
        writeln!(f, "{}", input.account_address)?;
        if let Some(statement) = &metadata.statement {
            write!(f, "\n{statement}\n")?;
        }
        writeln!(f)?;
        writeln!(f, "URI: {}", metadata.uri)?;
        writeln!(f, "Version: {}", metadata.version)?;
        // EVM wallets expect the bare reference (EIP-4361).
        match input.chain_id.namespace {
            ChainNamespace::Eip155 => writeln!(f, "Chain ID: {}", input.chain_id.reference)?,
            _ => writeln!(f, "Chain ID: {}", input.chain_id)?,
        }
        write!(f, "Nonce: {}", metadata.nonce)?;

        let optional = [
            ("Issued At", identifier.issued_at.as_ref()),
            ("Expiration Time", identifier.expiration_time.as_ref()),
            ("Not Before", input.not_before.as_ref()),
            ("Request ID", identifier.request_id.as_ref()),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                write!(f, "\n{label}: {value}")?;
            }
        }

        if let Some(resources) = metadata.resources.as_ref().filter(|r| !r.is_empty()) {
            write!(f, "\nResources:")?;
            for resource in resources {
                write!(f, "\n- {resource}")?;
            }
        }
        Ok(())
    }
}
