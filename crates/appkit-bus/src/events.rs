//! # AppKit Events
//!
//! Defines all event types that flow through the bus.

use appkit_types::{ChainNamespace, CaipNetworkId};
use serde::{Deserialize, Serialize};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppKitEvent {
    // =========================================================================
    // AK-01: CONNECTOR REGISTRY
    // =========================================================================
    /// The merged connector view was recomputed.
    ConnectorsChanged {
        /// Number of entries in the merged view.
        count: usize,
    },

    /// The active connector of a namespace changed.
    ActiveConnectorChanged {
        /// Namespace.
        namespace: ChainNamespace,
        /// New connector id, `None` when cleared.
        connector_id: Option<String>,
    },

    // =========================================================================
    // AK-03: CONNECTION MANAGER
    // =========================================================================
    /// A connector produced a live connection.
    ConnectionEstablished {
        /// Namespace.
        namespace: ChainNamespace,
        /// Connector id.
        connector_id: String,
        /// Number of accounts.
        account_count: usize,
        /// Active network.
        caip_network_id: Option<CaipNetworkId>,
    },

    /// A connection was removed.
    ConnectionRemoved {
        /// Namespace.
        namespace: ChainNamespace,
        /// Connector id.
        connector_id: String,
    },

    /// A connector probe failed during reconciliation.
    ProbeFailed {
        /// Namespace.
        namespace: ChainNamespace,
        /// Connector id.
        connector_id: String,
        /// Failure message.
        reason: String,
    },

    // =========================================================================
    // AK-04: PROVIDER BRIDGE
    // =========================================================================
    /// The universal provider emitted a pairing URI.
    PairingUri {
        /// WalletConnect URI.
        uri: String,
    },

    // =========================================================================
    // AK-05: SIWX
    // =========================================================================
    /// Analytics track event.
    Track(TrackEvent),

    // =========================================================================
    // RUNTIME: ACCOUNT STATE
    // =========================================================================
    /// The active account of a namespace changed.
    AccountChanged {
        /// Namespace.
        namespace: ChainNamespace,
        /// New CAIP-10 address, `None` when disconnected.
        caip_address: Option<String>,
    },

    /// The active network changed.
    NetworkChanged {
        /// New network.
        caip_network_id: CaipNetworkId,
    },
}

impl AppKitEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ConnectorsChanged { .. } | Self::ActiveConnectorChanged { .. } => {
                EventTopic::Connectors
            }
            Self::ConnectionEstablished { .. }
            | Self::ConnectionRemoved { .. }
            | Self::ProbeFailed { .. } => EventTopic::Connections,
            Self::PairingUri { .. } => EventTopic::Provider,
            Self::Track(_) => EventTopic::Track,
            Self::AccountChanged { .. } | Self::NetworkChanged { .. } => EventTopic::Account,
        }
    }

    /// Get the subsystem that emits this event, `0` for the runtime.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::ConnectorsChanged { .. } | Self::ActiveConnectorChanged { .. } => 1,
            Self::ConnectionEstablished { .. }
            | Self::ConnectionRemoved { .. }
            | Self::ProbeFailed { .. } => 3,
            Self::PairingUri { .. } => 4,
            Self::Track(_) => 5,
            Self::AccountChanged { .. } | Self::NetworkChanged { .. } => 0,
        }
    }
}

/// Properties attached to SIWX track events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiwxEventProperties {
    /// Active CAIP-2 network, empty when unknown.
    pub network: String,
    /// Whether the active account is a smart account.
    pub is_smart_account: bool,
    /// Error message for failure events.
    pub message: Option<String>,
}

/// Analytics track event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "properties")]
pub enum TrackEvent {
    /// The user signed in.
    #[serde(rename = "SIWX_AUTH_SUCCESS")]
    SiwxAuthSuccess(SiwxEventProperties),
    /// Sign-in failed.
    #[serde(rename = "SIWX_AUTH_ERROR")]
    SiwxAuthError(SiwxEventProperties),
    /// The user cancelled the sign-in prompt.
    #[serde(rename = "CLICK_CANCEL_SIWX")]
    ClickCancelSiwx(SiwxEventProperties),
}

impl TrackEvent {
    /// Wire name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SiwxAuthSuccess(_) => "SIWX_AUTH_SUCCESS",
            Self::SiwxAuthError(_) => "SIWX_AUTH_ERROR",
            Self::ClickCancelSiwx(_) => "CLICK_CANCEL_SIWX",
        }
    }

    /// Event properties.
    #[must_use]
    pub fn properties(&self) -> &SiwxEventProperties {
        match self {
            Self::SiwxAuthSuccess(p) | Self::SiwxAuthError(p) | Self::ClickCancelSiwx(p) => p,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Connector registry events.
    Connectors,
    /// Connection manager events.
    Connections,
    /// Universal provider events.
    Provider,
    /// Analytics events.
    Track,
    /// Active account and network.
    Account,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &AppKitEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
