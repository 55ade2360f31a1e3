//! # AppKit Runtime Library
//!
//! Wires the connection-core subsystems into one client. The `appkit-runtime`
//! binary is a thin entry point over this library.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: subsystems define ports, the runtime
//!   provides the adapters ([`adapters::ClientState`] is the SIWX host)
//! - **Event-Driven**: state changes are published on the shared
//!   [`appkit_bus::InMemoryEventBus`]
//! - **One manager per namespace**: every requested chain family gets its
//!   own connection manager
//!
//! ## Module Structure
//!
//! ```text
//! appkit-runtime/
//! ├── container/   # AppKitConfig, AppKit container and flows
//! ├── adapters/    # ClientState (SIWX host port)
//! └── wiring/      # WalletConnect provider event routing
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod wiring;

// Re-exports
pub use adapters::{ClientState, ModalView, Signer};
pub use container::{AppKit, AppKitConfig, AppKitError, ConfigError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
