//! # Integration Tests
//!
//! Each flow drives a real `SyncEngine` from an `InMemoryEventBus` against
//! the scripted `MockLedger`.

pub mod sync_flows;
