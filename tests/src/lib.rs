//! # nft-sync Test Suite
//!
//! Cross-crate flows that need the engine, the bus and a ledger together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Engine flows over the event bus
//!     └── sync_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nft-tests
//! cargo test -p nft-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
