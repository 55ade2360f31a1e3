//! # Integration Tests
//!
//! Cross-subsystem flows driven through the public APIs of every crate.

pub mod connect_flows;
pub mod restore_flows;
pub mod siwx_flows;
