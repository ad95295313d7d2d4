//! # NFT Node
//!
//! Hosts one sync engine against a JSON-RPC ledger.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logs, Prometheus collectors)
//! 2. Load `NodeConfig` from the environment
//! 3. Build the ledger adapter and the runtime (engine subscribes to the bus)
//! 4. Start the engine, the log poller and the snapshot logger
//! 5. Wait for Ctrl+C, then signal shutdown to every task

pub mod config;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use runtime::{metrics_hooks, NodeRuntime};
