//! # State Store
//!
//! Owns the only reference to the current snapshot and applies events
//! through the reducer strictly one at a time.
//!
//! ```text
//! seed ──▶ reduce ──▶ publish
//!            ▲
//! bus ───────┘  next event is pulled only after the previous publish
//! ```
//!
//! Unread events wait in the subscription's bounded mailbox; while it is
//! full the event source is held back, so nothing is skipped.

use shared_bus::Subscription;
use shared_types::{EventKind, LedgerEvent};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::algorithms::{Reducer, TotalSupplySource};
use crate::application::publisher::SnapshotPublisher;
use crate::config::FetchFailurePolicy;
use crate::domain::{Snapshot, SyncError};

/// Outcome of one reduction, reported to the optional hook.
#[derive(Debug)]
pub enum ReductionOutcome<'a> {
    /// The snapshot was replaced and published.
    Applied {
        /// Kind of the event reduced.
        kind: EventKind,
        /// Newly published snapshot.
        snapshot: &'a Arc<Snapshot>,
    },
    /// The reduction failed; nothing was published.
    Failed {
        /// Kind of the event reduced.
        kind: EventKind,
        /// Why.
        error: &'a SyncError,
    },
}

/// Called after every reduction.
pub type ReductionHook = Arc<dyn Fn(&ReductionOutcome<'_>) + Send + Sync>;

/// Counters kept by the store over its lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Events pulled from the bus (the seed is not counted).
    pub events_received: u64,
    /// Successful reductions, seed included.
    pub reductions: u64,
    /// Reductions that failed and published nothing.
    pub reductions_failed: u64,
}

/// Sequential reduction actor.
pub struct StateStore<S: TotalSupplySource> {
    reducer: Reducer<S>,
    publisher: Arc<SnapshotPublisher>,
    policy: FetchFailurePolicy,
    current: Option<Arc<Snapshot>>,
    hook: Option<ReductionHook>,
    stats: StoreStats,
}

impl<S: TotalSupplySource> StateStore<S> {
    /// Create an empty store.
    pub fn new(
        reducer: Reducer<S>,
        publisher: Arc<SnapshotPublisher>,
        policy: FetchFailurePolicy,
    ) -> Self {
        Self {
            reducer,
            publisher,
            policy,
            current: None,
            hook: None,
            stats: StoreStats::default(),
        }
    }

    /// Observe every reduction.
    #[must_use]
    pub fn with_hook(mut self, hook: Option<ReductionHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Current snapshot held by the store.
    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.current.as_ref()
    }

    /// Counters so far.
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Reduce one event and publish the result.
    ///
    /// On failure the current snapshot is left untouched and nothing is
    /// published.
    pub async fn apply(&mut self, event: &LedgerEvent) -> Result<Arc<Snapshot>, SyncError> {
        let kind = event.kind();
        match self.reducer.reduce(self.current.as_deref(), event).await {
            Ok(next) => {
                let snapshot = self.publisher.publish(next);
                self.current = Some(Arc::clone(&snapshot));
                self.stats.reductions += 1;
                if let Some(hook) = &self.hook {
                    hook(&ReductionOutcome::Applied {
                        kind,
                        snapshot: &snapshot,
                    });
                }
                Ok(snapshot)
            }
            Err(e) => {
                self.stats.reductions_failed += 1;
                if let Some(hook) = &self.hook {
                    hook(&ReductionOutcome::Failed { kind, error: &e });
                }
                Err(e)
            }
        }
    }

    /// Reduce `seed`, then every event from `subscription` in arrival order,
    /// until the bus closes.
    pub async fn run(
        mut self,
        seed: LedgerEvent,
        mut subscription: Subscription,
    ) -> Result<StoreStats, SyncError> {
        self.apply(&seed).await?;
        info!("[nft-sync] Seeded, processing ledger events");

        while let Some(event) = subscription.recv().await {
            self.stats.events_received += 1;
            let kind = event.kind();
            debug!(kind = kind.as_str(), "[nft-sync] Reducing event");

            if let Err(e) = self.apply(&event).await {
                match self.policy {
                    FetchFailurePolicy::SkipEvent => {
                        error!(
                            kind = kind.as_str(),
                            error = %e,
                            "[nft-sync] Reduction failed, event skipped"
                        );
                    }
                    FetchFailurePolicy::Halt => {
                        error!(
                            kind = kind.as_str(),
                            error = %e,
                            "[nft-sync] Reduction failed, halting"
                        );
                        return Err(e);
                    }
                }
            }
        }

        info!(
            reductions = self.stats.reductions,
            failed = self.stats.reductions_failed,
            "[nft-sync] Event bus closed, store stopped"
        );
        Ok(self.stats)
    }
}
