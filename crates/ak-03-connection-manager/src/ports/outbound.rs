//! # Outbound Ports
//!
//! Dependencies the Connection Manager reads from its host.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Persisted connection history of one connector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// The user explicitly disconnected it.
    pub has_disconnected: bool,
    /// It was connected before.
    pub has_connected: bool,
}

impl ConnectionStatus {
    /// Whether a sync should probe the connector.
    #[must_use]
    pub fn should_probe(&self) -> bool {
        !self.has_disconnected && self.has_connected
    }
}

/// Source of per-connector connection history.
pub trait ConnectionStatusSource: Send + Sync {
    /// History of `connector_id`.
    fn status(&self, connector_id: &str) -> ConnectionStatus;
}

/// In-memory connection history for testing.
#[derive(Default)]
pub struct InMemoryConnectionStatus {
    statuses: RwLock<HashMap<String, ConnectionStatus>>,
}

impl InMemoryConnectionStatus {
    /// Empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful connection.
    pub fn mark_connected(&self, connector_id: &str) {
        let mut statuses = self.statuses.write();
        let status = statuses.entry(connector_id.to_string()).or_default();
        status.has_connected = true;
        status.has_disconnected = false;
    }

    /// Record an explicit disconnect.
    pub fn mark_disconnected(&self, connector_id: &str) {
        self.statuses
            .write()
            .entry(connector_id.to_string())
            .or_default()
            .has_disconnected = true;
    }
}

impl ConnectionStatusSource for InMemoryConnectionStatus {
    fn status(&self, connector_id: &str) -> ConnectionStatus {
        self.statuses
            .read()
            .get(connector_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_probe() {
        let history = InMemoryConnectionStatus::new();
        assert!(!history.status("metamask").should_probe());

        history.mark_connected("metamask");
        assert!(history.status("metamask").should_probe());

        history.mark_disconnected("metamask");
        assert!(!history.status("metamask").should_probe());
    }
}
