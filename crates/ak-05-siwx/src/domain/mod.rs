//! # Domain Module
//!
//! SIWX messages, sessions and errors.

pub mod errors;
pub mod message;
pub mod session;

pub use errors::*;
pub use message::*;
pub use session::*;
