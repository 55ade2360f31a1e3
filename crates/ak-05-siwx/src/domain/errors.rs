//! SIWX error types.

use appkit_types::ProviderError;
use thiserror::Error;

/// SIWX errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiwxError {
    /// No SIWX config is installed.
    #[error("SIWX is not enabled")]
    Disabled,

    /// No account is connected.
    #[error("No ActiveCaipAddress found")]
    NoActiveAddress,

    /// No network is active.
    #[error("No ActiveCaipNetwork or client found")]
    NoActiveNetwork,

    /// Signing or verification failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The SIWX config rejected the operation.
    #[error("SIWX config error: {0}")]
    Config(String),

    /// The wallet or transport failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
