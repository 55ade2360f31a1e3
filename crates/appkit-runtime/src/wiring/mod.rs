//! # Subsystem Wiring
//!
//! Connects the WalletConnect provider's events to the subsystems.

pub mod provider_events;

pub use provider_events::listen_provider_events;
