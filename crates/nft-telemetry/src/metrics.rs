//! Prometheus metrics for the sync engine.
//!
//! All metrics follow the naming convention: `nft_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., snapshots_published_total)
//! - **Gauge**: Value that can go up or down (e.g., total_supply)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Failed bootstrap handshake attempts
    pub static ref BOOTSTRAP_RETRIES: Counter = Counter::new(
        "nft_bootstrap_retries_total",
        "Failed bootstrap attempts followed by a backoff sleep"
    ).expect("metric creation failed");

    /// Delay chosen before the latest bootstrap re-attempt
    pub static ref BOOTSTRAP_BACKOFF_SECONDS: Gauge = Gauge::new(
        "nft_bootstrap_backoff_seconds",
        "Delay before the next bootstrap attempt"
    ).expect("metric creation failed");

    // =========================================================================
    // STATE STORE
    // =========================================================================

    /// Snapshots published to watchers
    pub static ref SNAPSHOTS_PUBLISHED: Counter = Counter::new(
        "nft_store_snapshots_published_total",
        "Total number of snapshots published"
    ).expect("metric creation failed");

    /// Reductions that failed and published nothing
    pub static ref REDUCTIONS_FAILED: CounterVec = CounterVec::new(
        Opts::new("nft_store_reductions_failed_total", "Failed reductions by event kind"),
        &["event_kind"]  // seed/transfer/other
    ).expect("metric creation failed");

    /// Supply as last reported by the ledger
    pub static ref TOTAL_SUPPLY: Gauge = Gauge::new(
        "nft_snapshot_total_supply",
        "Token total supply in the latest snapshot"
    ).expect("metric creation failed");

    /// Token records held in the latest snapshot
    pub static ref TRANSACTIONS_TRACKED: Gauge = Gauge::new(
        "nft_snapshot_transactions_tracked",
        "Number of token records in the latest snapshot"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS
    // =========================================================================

    /// Events reduced by the store
    pub static ref BUS_EVENTS_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("nft_eventbus_events_received_total", "Events reduced, by kind"),
        &["event_kind"]
    ).expect("metric creation failed");
}

/// Handle proving the collectors are registered.
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors registered by this call.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already present are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Bootstrap
        Box::new(BOOTSTRAP_RETRIES.clone()),
        Box::new(BOOTSTRAP_BACKOFF_SECONDS.clone()),
        // Store
        Box::new(SNAPSHOTS_PUBLISHED.clone()),
        Box::new(REDUCTIONS_FAILED.clone()),
        Box::new(TOTAL_SUPPLY.clone()),
        Box::new(TRANSACTIONS_TRACKED.clone()),
        // Event bus
        Box::new(BUS_EVENTS_RECEIVED.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
