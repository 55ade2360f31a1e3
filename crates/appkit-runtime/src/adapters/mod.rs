//! # Runtime Adapters
//!
//! Port implementations provided by the runtime.
//!
//! - [`ClientState`]: the SIWX host port (ak-05) over the client's
//!   account, network and modal state.

pub mod client_state;

pub use client_state::{ClientState, ModalView, Signer};
