//! # WalletConnect Types
//!
//! Proposal namespaces, established sessions and CACAO auth objects
//! exchanged with a universal provider.

use crate::caip::{parse_caip_network_id, ChainNamespace, CaipNetworkId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Proposal namespace: what the dApp asks the wallet for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    /// RPC methods.
    pub methods: Vec<String>,
    /// CAIP-2 chain ids.
    pub chains: Vec<String>,
    /// Event names.
    pub events: Vec<String>,
    /// Bare chain reference to RPC URL.
    pub rpc_map: BTreeMap<String, String>,
}

/// Proposal namespaces keyed by chain family.
pub type NamespaceConfig = BTreeMap<ChainNamespace, Namespace>;

/// Namespace approved by the wallet in an established session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNamespace {
    /// Declared chains, if the wallet lists them.
    #[serde(default)]
    pub chains: Option<Vec<String>>,
    /// CAIP-10 accounts.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Approved methods.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Approved events.
    #[serde(default)]
    pub events: Vec<String>,
}

/// Session namespaces keyed by chain family.
pub type SessionNamespaces = BTreeMap<ChainNamespace, SessionNamespace>;

/// Metadata of the session peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMetadata {
    /// Wallet name.
    pub name: String,
    /// Wallet description.
    #[serde(default)]
    pub description: String,
    /// Wallet homepage.
    #[serde(default)]
    pub url: String,
    /// Icon URLs.
    #[serde(default)]
    pub icons: Vec<String>,
}

/// An established WalletConnect session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session topic.
    pub topic: String,
    /// Approved namespaces.
    pub namespaces: SessionNamespaces,
    /// Peer wallet metadata.
    #[serde(default)]
    pub peer: PeerMetadata,
}

impl Session {
    /// All CAIP-10 accounts of a namespace.
    pub fn accounts(&self, namespace: &ChainNamespace) -> &[String] {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.accounts.as_slice())
            .unwrap_or_default()
    }
}

/// Chain id as reported by `chainChanged`: EVM wallets send numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainIdValue {
    /// Numeric reference.
    Number(u64),
    /// String reference or CAIP-2 id.
    String(String),
}

impl ChainIdValue {
    /// The bare chain reference.
    pub fn reference(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::String(s) => match parse_caip_network_id(s) {
                Ok(id) => id.reference,
                Err(_) => s.clone(),
            },
        }
    }
}

/// Parameters for one-click authentication.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateParams {
    /// Challenge nonce.
    pub nonce: String,
    /// Requesting domain.
    pub domain: String,
    /// Requesting URI.
    pub uri: String,
    /// Expiration time (ISO 8601).
    pub exp: Option<String>,
    /// Issued-at time (ISO 8601).
    pub iat: Option<String>,
    /// Not-before time (ISO 8601).
    pub nbf: Option<String>,
    /// Request id.
    pub request_id: Option<String>,
    /// Message version.
    pub version: String,
    /// Resource URIs.
    pub resources: Option<Vec<String>>,
    /// Human-readable statement.
    pub statement: Option<String>,
    /// Chain used to build the message.
    pub chain_id: String,
    /// Methods to authorize.
    pub methods: Vec<String>,
    /// Chains to authorize; the first one builds the message.
    pub chains: Vec<String>,
}

/// Result of one-click authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateResult {
    /// The session established alongside the auth.
    pub session: Session,
    /// Signed auth objects, one per authorized chain.
    #[serde(default)]
    pub auths: Vec<Cacao>,
}

// =============================================================================
// CACAO
// =============================================================================

/// CACAO header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacaoHeader {
    /// Always `caip122`.
    pub t: String,
}

impl Default for CacaoHeader {
    fn default() -> Self {
        Self {
            t: "caip122".to_string(),
        }
    }
}

/// CACAO payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacaoPayload {
    /// Requesting domain.
    pub domain: String,
    /// Audience URI.
    pub aud: String,
    /// Challenge nonce.
    pub nonce: String,
    /// Issuer DID, `did:pkh:<ns>:<ref>:<address>`.
    pub iss: String,
    /// Message version.
    #[serde(default)]
    pub version: Option<String>,
    /// Issued-at time.
    #[serde(default)]
    pub iat: Option<String>,
    /// Not-before time.
    #[serde(default)]
    pub nbf: Option<String>,
    /// Expiration time.
    #[serde(default)]
    pub exp: Option<String>,
    /// Human-readable statement.
    #[serde(default)]
    pub statement: Option<String>,
    /// Request id.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Resource URIs.
    #[serde(default)]
    pub resources: Option<Vec<String>>,
    /// Payload type.
    #[serde(rename = "type", default)]
    pub payload_type: Option<String>,
}

/// CACAO signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacaoSignature {
    /// Signature type, `eip191` or `eip1271`.
    pub t: String,
    /// Signature bytes.
    pub s: String,
    /// Optional signature metadata.
    #[serde(default)]
    pub m: Option<String>,
}

/// Chain-agnostic capability object (CAIP-74).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cacao {
    /// Header.
    pub h: CacaoHeader,
    /// Payload.
    pub p: CacaoPayload,
    /// Signature.
    pub s: CacaoSignature,
}

impl Cacao {
    /// Address segment of the issuer DID.
    pub fn account_address(&self) -> String {
        self.p.iss.rsplit(':').next().unwrap_or_default().to_string()
    }

    /// CAIP-2 chain id segment of the issuer DID.
    pub fn chain_id(&self) -> String {
        self.p
            .iss
            .split(':')
            .skip(2)
            .take(2)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Render the CAIP-122 message the wallet signed.
    pub fn format_message(&self) -> String {
        let chain_id = self.chain_id();
        let (chain_name, reference) = match parse_caip_network_id(&chain_id) {
            Ok(CaipNetworkId {
                namespace,
                reference,
            }) => (namespace.display_name().to_string(), reference),
            Err(_) => ("Ethereum".to_string(), chain_id.clone()),
        };

        let p = &self.p;
        let mut out = format!(
            "{} wants you to sign in with your {} account:\n{}\n",
            p.domain,
            chain_name,
            self.account_address()
        );
        if let Some(statement) = &p.statement {
            let _ = write!(out, "\n{statement}\n");
        }
        let _ = write!(out, "\nURI: {}", p.aud);
        let _ = write!(out, "\nVersion: {}", p.version.as_deref().unwrap_or("1"));
        let _ = write!(out, "\nChain ID: {reference}");
        let _ = write!(out, "\nNonce: {}", p.nonce);
        if let Some(iat) = &p.iat {
            let _ = write!(out, "\nIssued At: {iat}");
        }
        if let Some(exp) = &p.exp {
            let _ = write!(out, "\nExpiration Time: {exp}");
        }
        if let Some(nbf) = &p.nbf {
            let _ = write!(out, "\nNot Before: {nbf}");
        }
        if let Some(request_id) = &p.request_id {
            let _ = write!(out, "\nRequest ID: {request_id}");
        }
        if let Some(resources) = p.resources.as_ref().filter(|r| !r.is_empty()) {
            out.push_str("\nResources:");
            for resource in resources {
                let _ = write!(out, "\n- {resource}");
            }
        }
        out
    }
}
