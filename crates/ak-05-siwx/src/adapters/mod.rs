//! # Adapters
//!
//! Concrete SIWX config implementations.

pub mod in_memory;

pub use in_memory::InMemorySiwxConfig;
