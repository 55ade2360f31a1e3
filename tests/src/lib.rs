//! # AppKit Test Suite
//!
//! Unified test crate for flows that span several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── connection_core.rs   # CAIP parsing, proposals, connector merging
//! └── src/integration/
//!     ├── connect_flows.rs     # Registry → namespaces → WalletConnect → managers
//!     ├── restore_flows.rs     # Connection history → sync → active account
//!     └── siwx_flows.rs        # Connect → prompt → sign → disconnect/revoke
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ak-tests
//!
//! # By flow
//! cargo test -p ak-tests integration::siwx_flows
//!
//! # Benchmarks
//! cargo bench -p ak-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
