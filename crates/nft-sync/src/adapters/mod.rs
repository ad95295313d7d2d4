//! # Adapters Module
//!
//! Outbound port implementations against a live ledger node.

pub mod abi;
pub mod json_rpc;
pub mod log_poller;

pub use json_rpc::{decode_transfer_log, JsonRpcLedger, RpcLog};
pub use log_poller::{LogPoller, PollerConfig};
