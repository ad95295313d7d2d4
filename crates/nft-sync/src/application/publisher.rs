//! # Snapshot Publisher
//!
//! Makes the current snapshot observable to the presentation layer.
//!
//! Backed by a `watch` channel of `Option<Arc<Snapshot>>`: `None` until the
//! seed is reduced, then always a whole snapshot. Watchers that fall behind
//! see only the latest value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::{Snapshot, SyncError};

/// Write side, owned by the state store.
pub struct SnapshotPublisher {
    sender: watch::Sender<Option<Arc<Snapshot>>>,
    published: AtomicU64,
}

impl SnapshotPublisher {
    /// Create a publisher with no snapshot yet.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Replace the current snapshot. Succeeds with or without watchers.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.sender.send_replace(Some(Arc::clone(&snapshot)));
        let count = self.published.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            publication = count,
            total_supply = %snapshot.total_supply,
            records = snapshot.transactions.len(),
            "[nft-sync] Snapshot published"
        );
        snapshot
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.sender.borrow().clone()
    }

    /// New read handle.
    #[must_use]
    pub fn watcher(&self) -> SnapshotWatcher {
        SnapshotWatcher {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of snapshots published so far.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side, handed to consumers.
#[derive(Clone)]
pub struct SnapshotWatcher {
    receiver: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl SnapshotWatcher {
    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication after the last one this handle saw.
    pub async fn changed(&mut self) -> Result<Arc<Snapshot>, SyncError> {
        loop {
            self.receiver
                .changed()
                .await
                .map_err(|_| SyncError::PublisherClosed)?;
            if let Some(snapshot) = self.receiver.borrow_and_update().clone() {
                return Ok(snapshot);
            }
        }
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// Returns immediately if the current one already does.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<Arc<Snapshot>, SyncError>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let current = self
            .receiver
            .wait_for(|value| value.as_deref().is_some_and(&mut predicate))
            .await
            .map_err(|_| SyncError::PublisherClosed)?;
        current.clone().ok_or(SyncError::PublisherClosed)
    }
}
