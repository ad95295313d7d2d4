//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod bootstrap;
pub mod fetcher;
pub mod publisher;
pub mod service;
pub mod store;

pub use bootstrap::Bootstrap;
pub use fetcher::RemoteValueFetcher;
pub use publisher::{SnapshotPublisher, SnapshotWatcher};
pub use service::{SyncEngine, TokenSyncService};
pub use store::{ReductionHook, ReductionOutcome, StateStore, StoreStats};
