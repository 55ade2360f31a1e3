//! # Domain Module
//!
//! Static method tables, override application, origin allowlists and
//! session-payload predicates.

pub mod methods;
pub mod origin;
pub mod overrides;
pub mod predicates;

pub use methods::*;
pub use origin::*;
pub use overrides::*;
pub use predicates::*;
