//! # CAIP Identifiers
//!
//! CAIP-2 chain ids (`namespace:reference`) and CAIP-10 account ids
//! (`namespace:reference:address`).
//!
//! The strict parse functions fail with [`ParseError`]; `Display` is the
//! inverse, so `parse(s).to_string() == s` for every well-formed `s`.

use crate::errors::ParseError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Chain family tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainNamespace {
    /// EVM chains.
    Eip155,
    /// Solana clusters.
    Solana,
    /// Bitcoin networks.
    Bip122,
    /// Polkadot relay and parachains.
    Polkadot,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl ChainNamespace {
    /// Namespaces with first-class handling.
    pub const AVAILABLE: [ChainNamespace; 4] = [
        ChainNamespace::Eip155,
        ChainNamespace::Solana,
        ChainNamespace::Bip122,
        ChainNamespace::Polkadot,
    ];

    /// Parse a tag. Never fails: unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "eip155" => Self::Eip155,
            "solana" => Self::Solana,
            "bip122" => Self::Bip122,
            "polkadot" => Self::Polkadot,
            other => Self::Other(other.to_string()),
        }
    }

    /// The string tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eip155 => "eip155",
            Self::Solana => "solana",
            Self::Bip122 => "bip122",
            Self::Polkadot => "polkadot",
            Self::Other(tag) => tag,
        }
    }

    /// Name shown to the user in sign-in messages.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Eip155 => "Ethereum",
            Self::Solana => "Solana",
            Self::Bip122 => "Bitcoin",
            Self::Polkadot => "Polkadot",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ChainNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ChainNamespace {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl Serialize for ChainNamespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChainNamespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// CAIP-2 chain id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaipNetworkId {
    /// Chain family.
    pub namespace: ChainNamespace,
    /// Chain reference within the family.
    pub reference: String,
}

impl CaipNetworkId {
    /// Create a new chain id.
    pub fn new(namespace: ChainNamespace, reference: impl Into<String>) -> Self {
        Self {
            namespace,
            reference: reference.into(),
        }
    }
}

impl fmt::Display for CaipNetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for CaipNetworkId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_caip_network_id(s)
    }
}

/// CAIP-10 account id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaipAddress {
    /// Chain family.
    pub namespace: ChainNamespace,
    /// Chain reference within the family.
    pub reference: String,
    /// Account address on that chain.
    pub address: String,
}

impl CaipAddress {
    /// Create a new account id.
    pub fn new(
        namespace: ChainNamespace,
        reference: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            reference: reference.into(),
            address: address.into(),
        }
    }

    /// Build an account id on a known network.
    pub fn on_network(network: &CaipNetworkId, address: impl Into<String>) -> Self {
        Self::new(
            network.namespace.clone(),
            network.reference.clone(),
            address,
        )
    }

    /// The CAIP-2 id of the chain this account lives on.
    pub fn network_id(&self) -> CaipNetworkId {
        CaipNetworkId::new(self.namespace.clone(), self.reference.clone())
    }
}

impl fmt::Display for CaipAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.reference, self.address)
    }
}

impl FromStr for CaipAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_caip_address(s)
    }
}

/// Parse `namespace:reference`.
pub fn parse_caip_network_id(s: &str) -> Result<CaipNetworkId, ParseError> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [namespace, reference] if !namespace.is_empty() && !reference.is_empty() => Ok(
            CaipNetworkId::new(ChainNamespace::from_tag(namespace), *reference),
        ),
        _ => Err(ParseError::InvalidNetworkId(s.to_string())),
    }
}

/// Parse `namespace:reference:address`.
pub fn parse_caip_address(s: &str) -> Result<CaipAddress, ParseError> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [namespace, reference, address]
            if !namespace.is_empty() && !reference.is_empty() && !address.is_empty() =>
        {
            Ok(CaipAddress::new(
                ChainNamespace::from_tag(namespace),
                *reference,
                *address,
            ))
        }
        _ => Err(ParseError::InvalidAddress(s.to_string())),
    }
}

/// Address segment of a CAIP-10 string, or `None` if it is not one.
pub fn get_plain_address(caip_address: &str) -> Option<String> {
    parse_caip_address(caip_address).ok().map(|a| a.address)
}

macro_rules! string_serde {
    ($ty:ty, $parse:path) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                $parse(&s).map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(CaipNetworkId, parse_caip_network_id);
string_serde!(CaipAddress, parse_caip_address);
