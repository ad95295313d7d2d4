//! # Token Sync Service
//!
//! Wires bootstrap, reducer, store and publisher into one engine instance.
//!
//! `TokenSyncService::new` returns two halves:
//! - the service, the read/intent handle given to the presentation layer
//! - the engine, which must be driven (`run` or `spawn`) to make progress
//!
//! The bus subscription is taken at construction, so events published while
//! the bootstrap is still retrying are buffered rather than lost. Once the
//! mailbox is full, publishers wait until the engine starts draining it.

use async_trait::async_trait;
use shared_bus::{EventSubscriber, Subscription};
use shared_types::{Address, TokenId, TxHash};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::algorithms::{Reducer, RetryHook, RetryScheduler};
use crate::application::bootstrap::Bootstrap;
use crate::application::fetcher::RemoteValueFetcher;
use crate::application::publisher::{SnapshotPublisher, SnapshotWatcher};
use crate::application::store::{ReductionHook, StateStore, StoreStats};
use crate::config::SyncConfig;
use crate::domain::{Snapshot, SyncError};
use crate::ports::{LedgerReader, LedgerWriter, TokenSyncApi};

/// Presentation-facing handle of one sync engine.
pub struct TokenSyncService<L> {
    ledger: Arc<L>,
    publisher: Arc<SnapshotPublisher>,
}

impl<L> Clone for TokenSyncService<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<L: LedgerReader> TokenSyncService<L> {
    /// Build an engine over `ledger`, consuming events from `bus`.
    pub fn new(
        config: SyncConfig,
        ledger: Arc<L>,
        bus: &impl EventSubscriber,
    ) -> (Self, SyncEngine<L>) {
        let publisher = Arc::new(SnapshotPublisher::new());
        let subscription = bus.subscribe();

        let service = Self {
            ledger: Arc::clone(&ledger),
            publisher: Arc::clone(&publisher),
        };
        let engine = SyncEngine {
            config,
            ledger,
            publisher,
            subscription,
            retry_hook: None,
            reduction_hook: None,
        };
        (service, engine)
    }

    /// Number of snapshots published so far.
    pub fn publications(&self) -> u64 {
        self.publisher.published()
    }
}

#[async_trait]
impl<L: LedgerReader + LedgerWriter> TokenSyncApi for TokenSyncService<L> {
    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.publisher.current()
    }

    fn watch(&self) -> SnapshotWatcher {
        self.publisher.watcher()
    }

    async fn mint(&self, to: &str, token_id: TokenId) -> Result<TxHash, SyncError> {
        let recipient =
            Address::parse(to).map_err(|_| SyncError::InvalidRecipient(to.to_string()))?;

        let hash = self
            .ledger
            .mint(recipient, token_id)
            .await
            .map_err(SyncError::IntentRejected)?;
        info!(to = %recipient, token_id = %token_id, tx = %hash, "[nft-sync] Mint submitted");
        Ok(hash)
    }

    async fn burn(&self, token_id: TokenId) -> Result<TxHash, SyncError> {
        let hash = self
            .ledger
            .burn(token_id)
            .await
            .map_err(SyncError::IntentRejected)?;
        info!(token_id = %token_id, tx = %hash, "[nft-sync] Burn submitted");
        Ok(hash)
    }
}

/// The sequential processor of one engine instance.
pub struct SyncEngine<L: LedgerReader> {
    config: SyncConfig,
    ledger: Arc<L>,
    publisher: Arc<SnapshotPublisher>,
    subscription: Subscription,
    retry_hook: Option<RetryHook>,
    reduction_hook: Option<ReductionHook>,
}

impl<L: LedgerReader> SyncEngine<L> {
    /// Observe bootstrap retries.
    #[must_use]
    pub fn with_retry_hook(mut self, hook: RetryHook) -> Self {
        self.retry_hook = Some(hook);
        self
    }

    /// Observe every reduction.
    #[must_use]
    pub fn with_reduction_hook(mut self, hook: ReductionHook) -> Self {
        self.reduction_hook = Some(hook);
        self
    }

    /// Bootstrap, then process events until the bus closes.
    ///
    /// Returns early with an error when the bootstrap attempt cap is reached
    /// or a reduction fails under `FetchFailurePolicy::Halt`.
    pub async fn run(self) -> Result<StoreStats, SyncError> {
        let Self {
            config,
            ledger,
            publisher,
            subscription,
            retry_hook,
            reduction_hook,
        } = self;

        info!(
            initial_delay_ms = config.backoff.initial_delay_ms,
            factor = config.backoff.factor,
            "[nft-sync] Bootstrapping"
        );

        let fetcher = RemoteValueFetcher::new(Arc::clone(&ledger));
        let mut scheduler = RetryScheduler::new(config.backoff.clone());
        if let Some(hook) = retry_hook {
            scheduler = scheduler.with_hook(hook);
        }

        let identity = Bootstrap::new(fetcher.clone(), scheduler)
            .resolve()
            .await
            .map_err(|e| {
                warn!(error = %e, "[nft-sync] Bootstrap abandoned");
                e
            })?;
        let seed = identity.seed_event(ledger.contract_address());

        StateStore::new(Reducer::new(fetcher), publisher, config.on_fetch_failure)
            .with_hook(reduction_hook)
            .run(seed, subscription)
            .await
    }
}

impl<L: LedgerReader + 'static> SyncEngine<L> {
    /// Run the engine on its own task.
    pub fn spawn(self) -> JoinHandle<Result<StoreStats, SyncError>> {
        tokio::spawn(self.run())
    }
}
