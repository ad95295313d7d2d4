//! # Domain Errors
//!
//! Error types for the sync engine.

use shared_types::LedgerError;
use thiserror::Error;

use super::value_objects::LedgerQuery;

/// Sync engine error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A single-shot ledger read failed.
    #[error("Fetch of {query} failed: {source}")]
    Fetch {
        /// Query that failed
        query: LedgerQuery,
        /// Underlying ledger error
        source: LedgerError,
    },

    /// The ledger answered a query with a value of the wrong shape.
    #[error("Unexpected value for {query}: {value}")]
    UnexpectedValue {
        /// Query that was issued
        query: LedgerQuery,
        /// Raw value returned
        value: String,
    },

    /// Bootstrap gave up after the configured attempt cap.
    #[error("Retry exhausted after {attempts} attempts")]
    RetryExhausted {
        /// Attempts made
        attempts: u32,
    },

    /// Mint recipient is not a valid address.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// A mint or burn submission was refused by the ledger.
    #[error("Intent rejected: {0}")]
    IntentRejected(LedgerError),

    /// The snapshot channel was closed (engine stopped).
    #[error("Snapshot publisher closed")]
    PublisherClosed,
}
