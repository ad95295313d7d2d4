//! # Node Runtime
//!
//! Owns the event bus and the three long-running tasks of a node:
//!
//! ```text
//! LogPoller ──publish──▶ InMemoryEventBus ──subscribe──▶ SyncEngine ──▶ SnapshotPublisher
//!                                                                            │
//!                                                         snapshot logger ◀──┘
//! ```
//!
//! An optional fourth task dumps the Prometheus registry at debug level.
//! Every task watches the same shutdown channel.

use std::sync::Arc;

use nft_sync::{
    LedgerLogSource, LedgerReader, LedgerWriter, LogPoller, ReductionHook, ReductionOutcome,
    RetryHook, SyncEngine, TokenSyncApi, TokenSyncService,
};
use nft_telemetry::{
    encode_metrics, metric_inc, BOOTSTRAP_BACKOFF_SECONDS, BOOTSTRAP_RETRIES, BUS_EVENTS_RECEIVED,
    REDUCTIONS_FAILED, SNAPSHOTS_PUBLISHED, TOTAL_SUPPLY, TRANSACTIONS_TRACKED,
};
use shared_bus::InMemoryEventBus;
use shared_types::U256;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::NodeConfig;

/// Gauge value for a `uint256` supply; saturates above `u64::MAX`.
fn supply_as_f64(supply: U256) -> f64 {
    if supply > U256::from(u64::MAX) {
        f64::MAX
    } else {
        supply.low_u64() as f64
    }
}

/// Hooks feeding engine progress into the Prometheus collectors.
pub fn metrics_hooks() -> (RetryHook, ReductionHook) {
    let retry: RetryHook = Arc::new(|_attempt, delay| {
        metric_inc!(BOOTSTRAP_RETRIES);
        BOOTSTRAP_BACKOFF_SECONDS.set(delay.as_secs_f64());
    });

    let reduction: ReductionHook = Arc::new(|outcome: &ReductionOutcome<'_>| match outcome {
        ReductionOutcome::Applied { kind, snapshot } => {
            metric_inc!(BUS_EVENTS_RECEIVED, &[kind.as_str()]);
            metric_inc!(SNAPSHOTS_PUBLISHED);
            TOTAL_SUPPLY.set(supply_as_f64(snapshot.total_supply));
            TRANSACTIONS_TRACKED.set(snapshot.transactions.len() as f64);
        }
        ReductionOutcome::Failed { kind, .. } => {
            metric_inc!(BUS_EVENTS_RECEIVED, &[kind.as_str()]);
            metric_inc!(REDUCTIONS_FAILED, &[kind.as_str()]);
        }
    });

    (retry, reduction)
}

/// Render the metrics registry and log it at debug level.
pub fn dump_metrics() -> Option<String> {
    match encode_metrics() {
        Ok(text) => {
            debug!(target: "nft_metrics", "\n{text}");
            Some(text)
        }
        Err(e) => {
            warn!(error = %e, "[nft-node] Metrics encoding failed");
            None
        }
    }
}

/// One node: poller, engine and snapshot logger over a shared ledger.
pub struct NodeRuntime<L: LedgerReader> {
    config: NodeConfig,
    ledger: Arc<L>,
    bus: Arc<InMemoryEventBus>,
    service: TokenSyncService<L>,
    engine: Option<SyncEngine<L>>,
    tasks: Vec<JoinHandle<()>>,
    /// Shutdown signal sender
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (cloned into every task)
    shutdown_rx: watch::Receiver<bool>,
}

impl<L> NodeRuntime<L>
where
    L: LedgerReader + LedgerWriter + LedgerLogSource + 'static,
{
    /// Build the runtime. The engine subscribes to the bus immediately.
    pub fn new(config: NodeConfig, ledger: Arc<L>) -> Self {
        info!(contract = %config.contract, rpc_url = %config.rpc_url, "Creating nft-sync node runtime");

        let bus = Arc::new(InMemoryEventBus::new());
        let (service, engine) =
            TokenSyncService::new(config.sync.clone(), Arc::clone(&ledger), bus.as_ref());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            ledger,
            bus,
            service,
            engine: Some(engine),
            tasks: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Presentation handle of the engine.
    pub fn service(&self) -> TokenSyncService<L> {
        self.service.clone()
    }

    /// Spawn the engine, the poller and the snapshot logger.
    ///
    /// Calling it twice is a no-op.
    pub fn start(&mut self) {
        let Some(engine) = self.engine.take() else {
            warn!("Node runtime already started");
            return;
        };

        let (retry_hook, reduction_hook) = metrics_hooks();
        let engine = engine
            .with_retry_hook(retry_hook)
            .with_reduction_hook(reduction_hook);

        let mut engine_shutdown = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                result = engine.run() => match result {
                    Ok(stats) => info!(
                        reductions = stats.reductions,
                        failed = stats.reductions_failed,
                        "[nft-sync] Event stream closed"
                    ),
                    Err(e) => error!(error = %e, "[nft-sync] Engine stopped"),
                },
                _ = engine_shutdown.changed() => {
                    info!("[nft-sync] Shutdown signal received");
                }
            }
        }));

        let poller = LogPoller::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.bus),
            self.config.poller.clone(),
        );
        self.tasks.push(tokio::spawn(poller.run(self.shutdown_rx.clone())));

        let mut watcher = self.service.watch();
        let mut logger_shutdown = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = watcher.changed() => match changed {
                        Ok(snapshot) => info!(
                            name = snapshot.token_name.as_deref().unwrap_or("-"),
                            symbol = snapshot.token_symbol.as_deref().unwrap_or("-"),
                            total_supply = %snapshot.total_supply,
                            transactions = snapshot.transactions.len(),
                            "[nft-node] Snapshot published"
                        ),
                        Err(_) => break,
                    },
                    _ = logger_shutdown.changed() => break,
                }
            }
        }));

        if let Some(period) = self.config.metrics_log_interval {
            let mut metrics_shutdown = self.shutdown_rx.clone();
            self.tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                // First tick completes immediately
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            dump_metrics();
                        }
                        _ = metrics_shutdown.changed() => break,
                    }
                }
            }));
        }

        info!("Node is running");
    }

    /// Signal every task and wait for them to finish.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Task ended abnormally: {}", e);
            }
        }
        dump_metrics();
        info!("Shutdown complete");
    }
}
