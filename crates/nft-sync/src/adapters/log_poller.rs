//! # Log Poller
//!
//! Event source feeding the bus from the ledger's log history.
//!
//! ```text
//! tick ──▶ head() ──▶ events(cursor..=min(head, cursor+range-1)) ──▶ publish each ──▶ cursor = to + 1
//! ```
//!
//! A failed poll leaves the cursor where it was; the range is fetched again
//! on the next tick. Publishing waits for room in the engine's mailbox, so
//! a busy engine slows the poller down rather than losing logs.

use shared_bus::EventPublisher;
use shared_types::{LedgerError, LedgerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::ports::LedgerLogSource;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default maximum number of blocks per `events` query.
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 5000;

/// Poller configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    /// First block to read.
    pub from_block: u64,
    /// Delay between polls.
    pub interval: Duration,
    /// Maximum blocks per query.
    pub max_block_range: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            from_block: 0,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_block_range: DEFAULT_MAX_BLOCK_RANGE,
        }
    }
}

/// Polls a `LedgerLogSource` and republishes its events on the bus.
pub struct LogPoller<S: LedgerLogSource, P: EventPublisher> {
    source: Arc<S>,
    bus: Arc<P>,
    config: PollerConfig,
    next_block: u64,
}

impl<S: LedgerLogSource, P: EventPublisher> LogPoller<S, P> {
    /// Create a poller starting at `config.from_block`.
    pub fn new(source: Arc<S>, bus: Arc<P>, config: PollerConfig) -> Self {
        let next_block = config.from_block;
        Self {
            source,
            bus,
            config,
            next_block,
        }
    }

    /// Next block that has not been read yet.
    pub fn next_block(&self) -> u64 {
        self.next_block
    }

    /// Read one range and publish its events in ledger order.
    ///
    /// Returns the number of events published.
    pub async fn poll_once(&mut self) -> Result<usize, LedgerError> {
        let head = self.source.head().await?;
        if head < self.next_block {
            return Ok(0);
        }

        let span = self.config.max_block_range.max(1) - 1;
        let to_block = head.min(self.next_block.saturating_add(span));
        let events = self.source.events(self.next_block, to_block).await?;
        let count = events.len();

        for raw in events {
            self.bus.publish(LedgerEvent::from_raw(raw)).await;
        }

        debug!(
            from = self.next_block,
            to = to_block,
            events = count,
            "[nft-poller] Range published"
        );
        self.next_block = to_block + 1;
        Ok(count)
    }

    /// Poll until `shutdown` flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            from_block = self.next_block,
            interval_ms = self.config.interval.as_millis() as u64,
            "[nft-poller] Starting"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(
                            error = %e,
                            next_block = self.next_block,
                            "[nft-poller] Poll failed, will retry"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!(next_block = self.next_block, "[nft-poller] Shutdown signal received");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_bus::InMemoryEventBus;
    use shared_types::{RawLedgerEvent, RawReturnValues, TokenId};
    use std::collections::VecDeque;

    /// One transfer per block, head scripted per call.
    struct ScriptedLogs {
        heads: Mutex<VecDeque<Result<u64, LedgerError>>>,
        ranges: Mutex<Vec<(u64, u64)>>,
    }

    impl ScriptedLogs {
        fn new(heads: Vec<Result<u64, LedgerError>>) -> Self {
            Self {
                heads: Mutex::new(heads.into()),
                ranges: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerLogSource for ScriptedLogs {
        async fn head(&self) -> Result<u64, LedgerError> {
            self.heads
                .lock()
                .pop_front()
                .unwrap_or(Err(LedgerError::Unreachable("script drained".to_string())))
        }

        async fn events(&self, from: u64, to: u64) -> Result<Vec<RawLedgerEvent>, LedgerError> {
            self.ranges.lock().push((from, to));
            Ok((from..=to)
                .map(|block| RawLedgerEvent {
                    event: "Transfer".to_string(),
                    address: None,
                    transaction_hash: Some(format!("0x{:064x}", block)),
                    return_values: Some(RawReturnValues {
                        from: Some(format!("0x{:040x}", 0)),
                        to: Some(format!("0x{:040x}", 0xaa)),
                        token_id: Some(block.to_string()),
                    }),
                })
                .collect())
        }
    }

    fn config(from_block: u64, max_block_range: u64) -> PollerConfig {
        PollerConfig {
            from_block,
            interval: Duration::from_millis(10),
            max_block_range,
        }
    }

    #[tokio::test]
    async fn test_poll_publishes_in_order_and_advances() {
        let source = Arc::new(ScriptedLogs::new(vec![Ok(3)]));
        let bus = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe();
        let mut poller = LogPoller::new(source, bus.clone(), config(1, 100));

        assert_eq!(poller.poll_once().await.unwrap(), 3);
        assert_eq!(poller.next_block(), 4);

        for expected in 1..=3u64 {
            match sub.recv().await.unwrap() {
                LedgerEvent::Transfer { token_id, .. } => {
                    assert_eq!(token_id, TokenId::from(expected));
                }
                other => panic!("expected transfer, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_range_is_bounded() {
        let source = Arc::new(ScriptedLogs::new(vec![Ok(10), Ok(10)]));
        let bus = Arc::new(InMemoryEventBus::new());
        let mut poller = LogPoller::new(source.clone(), bus, config(0, 4));

        poller.poll_once().await.unwrap();
        poller.poll_once().await.unwrap();

        assert_eq!(*source.ranges.lock(), vec![(0, 3), (4, 7)]);
        assert_eq!(poller.next_block(), 8);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_cursor() {
        let source = Arc::new(ScriptedLogs::new(vec![
            Err(LedgerError::Unreachable("down".to_string())),
            Ok(2),
        ]));
        let bus = Arc::new(InMemoryEventBus::new());
        let mut poller = LogPoller::new(source, bus, config(2, 100));

        assert!(poller.poll_once().await.is_err());
        assert_eq!(poller.next_block(), 2);
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        assert_eq!(poller.next_block(), 3);
    }

    #[tokio::test]
    async fn test_head_behind_cursor_is_noop() {
        let source = Arc::new(ScriptedLogs::new(vec![Ok(4)]));
        let bus = Arc::new(InMemoryEventBus::new());
        let mut poller = LogPoller::new(source.clone(), bus, config(5, 100));

        assert_eq!(poller.poll_once().await.unwrap(), 0);
        assert!(source.ranges.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let source = Arc::new(ScriptedLogs::new(vec![Ok(0)]));
        let bus = Arc::new(InMemoryEventBus::new());
        let poller = LogPoller::new(source, bus, config(0, 100));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(poller.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        handle.await.unwrap();
    }
}
