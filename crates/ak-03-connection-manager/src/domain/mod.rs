//! # Domain Module
//!
//! Connection errors, the per-connector probe state machine and the pure
//! connection resolution rules.

pub mod errors;
pub mod resolve;
pub mod state;

pub use errors::*;
pub use resolve::*;
pub use state::*;
