//! # NFT Sync
//!
//! Keeps a local view of a token contract synchronized with the ledger's
//! event history.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Bootstrap against a ledger that may not be reachable yet, with
//!   exponential backoff
//! - Fold the ordered event stream into one materialized `Snapshot`
//! - Keep one `TransactionRecord` per token id (idempotent upsert)
//! - Publish every whole snapshot to the presentation layer
//!
//! ## Engine Flow
//!
//! ```text
//! Bootstrap (retry name, then symbol) ──▶ Seed
//!                                          │
//! Event bus ──▶ Transfer / Other ──────────┤
//!                                          ▼
//!                         StateStore ──▶ Reducer ──(totalSupply)──▶ Ledger
//!                              │
//!                              ▼
//!                      SnapshotPublisher ──▶ watchers
//! ```
//!
//! Reductions run strictly one at a time: the next event is pulled only
//! after the previous snapshot has been published.
//!
//! ## Module Structure
//!
//! ```text
//! nft-sync/
//! ├── domain/          # Snapshot, TransactionRecord, queries, metadata, errors
//! ├── algorithms/      # Reducer, keyed upsert, retry scheduler
//! ├── ports/           # TokenSyncApi (inbound) + ledger traits (outbound)
//! ├── application/     # Fetcher, bootstrap, store, publisher, service
//! ├── adapters/        # JSON-RPC ledger, log poller, ABI helpers
//! └── config.rs        # SyncConfig, BackoffPolicy, FetchFailurePolicy
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{JsonRpcLedger, LogPoller, PollerConfig};
pub use algorithms::{upsert_transaction, Reducer, RetryHook, RetryScheduler, TotalSupplySource};
pub use application::{
    Bootstrap, ReductionHook, ReductionOutcome, RemoteValueFetcher, SnapshotPublisher,
    SnapshotWatcher, StateStore, StoreStats, SyncEngine, TokenSyncService,
};
pub use config::{BackoffPolicy, FetchFailurePolicy, SyncConfig};
pub use domain::{
    invariant_order_preserved, invariant_unique_ids, invariant_write_once, LedgerQuery, Scalar,
    Snapshot, SyncError, TokenIdentity, TokenMetadata, TransactionRecord,
    DEFAULT_RETRY_FACTOR, DEFAULT_RETRY_INITIAL_MS,
};
pub use ports::{
    LedgerLogSource, LedgerReader, LedgerWriter, MockLedger, RecordedIntent, TokenSyncApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
