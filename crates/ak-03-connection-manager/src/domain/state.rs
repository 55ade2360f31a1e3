//! # Probe State Machine
//!
//! ```text
//! [Unknown] ──start──→ [Probing] ──succeeded──→ [Connected]
//!                          │
//!                          └──── failed ──────→ [Disconnected]
//! ```
//!
//! `Connected` and `Disconnected` re-enter `Probing` on the next sync. An
//! explicit disconnect moves any state to `Disconnected`.

/// Connection state of one connector within a namespace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Never probed.
    #[default]
    Unknown,
    /// A probe is in flight.
    Probing,
    /// The last probe produced a connection.
    Connected,
    /// The last probe failed, found no accounts, or the user disconnected.
    Disconnected,
}

/// Input driving a [`ConnectionState`] transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A probe started.
    Start,
    /// The probe produced a connection.
    Succeeded,
    /// The probe failed or found no accounts.
    Failed,
    /// The connector was explicitly disconnected.
    Disconnect,
}

impl ConnectionState {
    /// State after `event`. Invalid inputs leave the state unchanged.
    #[must_use]
    pub fn next(self, event: ProbeEvent) -> Self {
        match (self, event) {
            (_, ProbeEvent::Disconnect) => Self::Disconnected,
            (_, ProbeEvent::Start) => Self::Probing,
            (Self::Probing, ProbeEvent::Succeeded) => Self::Connected,
            (Self::Probing, ProbeEvent::Failed) => Self::Disconnected,
            (state, _) => state,
        }
    }

    /// True once a probe has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }
}
