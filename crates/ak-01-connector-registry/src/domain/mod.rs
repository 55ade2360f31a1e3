//! # Domain Module
//!
//! Pure connector folds: multi-chain merge and explorer matching.

pub mod explorer;
pub mod merge;

pub use explorer::*;
pub use merge::*;
