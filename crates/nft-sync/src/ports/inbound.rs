//! # Inbound Ports
//!
//! API trait defining what the presentation layer can do with the engine.

use async_trait::async_trait;
use shared_types::{TokenId, TxHash};
use std::sync::Arc;

use crate::application::SnapshotWatcher;
use crate::domain::{Snapshot, SyncError, TokenMetadata};

/// Token sync API - inbound port.
///
/// Read-only access to published snapshots plus the two outbound intents.
#[async_trait]
pub trait TokenSyncApi: Send + Sync {
    /// Latest published snapshot, `None` before the seed is reduced.
    fn snapshot(&self) -> Option<Arc<Snapshot>>;

    /// A handle that is notified on every publication.
    fn watch(&self) -> SnapshotWatcher;

    /// Ask the ledger to mint `token_id` to `to`.
    ///
    /// `to` is validated before anything is submitted. The snapshot only
    /// changes once the resulting `Transfer` event is observed.
    async fn mint(&self, to: &str, token_id: TokenId) -> Result<TxHash, SyncError>;

    /// Ask the ledger to burn `token_id`.
    async fn burn(&self, token_id: TokenId) -> Result<TxHash, SyncError>;

    /// Descriptive document for a token id.
    fn token_metadata(&self, token_id: TokenId) -> TokenMetadata {
        TokenMetadata::for_token(token_id)
    }
}
