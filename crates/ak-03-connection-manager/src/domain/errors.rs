//! Connection Manager error types.

use appkit_types::{ChainNamespace, ProviderError};
use thiserror::Error;

/// Connection Manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The namespace has no probing strategy.
    #[error("Unsupported chain namespace: {0}")]
    UnsupportedNamespace(ChainNamespace),

    /// None of the connector's chains is among the requested networks.
    #[error("No supported chain for connector {connector_id}")]
    NoSupportedChain {
        /// Connector id.
        connector_id: String,
    },

    /// The connector carries no wallet provider.
    #[error("Connector {0} has no provider")]
    NoProvider(String),

    /// No connector with that id.
    #[error("Connector not found: {0}")]
    ConnectorNotFound(String),

    /// The wallet provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
