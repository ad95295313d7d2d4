//! # NFT Telemetry
//!
//! Logging and metrics for the NFT sync engine.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber` (pretty or JSON)
//! - **Metrics**: Prometheus collectors in a crate-local registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nft_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `nft-sync` | Service name in logs |
//! | `NFT_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `NFT_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `NFT_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `NFT_NETWORK` | `devnet` | Network label |

#![warn(missing_docs)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, BOOTSTRAP_BACKOFF_SECONDS,
    BOOTSTRAP_RETRIES, BUS_EVENTS_RECEIVED, REDUCTIONS_FAILED, REGISTRY, SNAPSHOTS_PUBLISHED,
    TOTAL_SUPPLY, TRANSACTIONS_TRACKED,
};
pub use tracing_setup::{init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracerInit(String),

    /// A collector could not be created, registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration is unusable (bad filter directive).
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so counters exist before the first log line
    let metrics_handle = register_metrics()?;
    let tracing_guard = init_tracing(&config)?;

    Ok(TelemetryGuard {
        tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    tracing_guard: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = self.tracing_guard.service_name(), "Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
