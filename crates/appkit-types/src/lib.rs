//! # AppKit Types Crate
//!
//! Domain entities and capability ports shared by every AppKit subsystem.
//!
//! ## Contents
//!
//! - **CAIP identifiers**: strict CAIP-2/CAIP-10 parsing with `Display`
//!   round-trips.
//! - **Networks**: raw and fully-qualified network descriptors, plus the
//!   idempotent RPC/asset extension step.
//! - **Entities**: connectors, accounts and connections.
//! - **WalletConnect**: proposal/session namespaces and CACAO objects.
//! - **Capabilities**: the wallet-provider and universal-provider ports,
//!   with a scriptable mock wallet provider.

pub mod caip;
pub mod capabilities;
pub mod entities;
pub mod errors;
pub mod mock;
pub mod network;
pub mod networks;
pub mod walletconnect;

pub use caip::*;
pub use capabilities::*;
pub use entities::*;
pub use errors::*;
pub use network::*;
pub use walletconnect::*;
