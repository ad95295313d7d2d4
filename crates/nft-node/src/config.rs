//! # Node Configuration
//!
//! Everything the binary needs, read from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NFT_RPC_URL` | `http://localhost:8545` | Ledger JSON-RPC endpoint |
//! | `NFT_CONTRACT_ADDRESS` | (required) | Observed token contract |
//! | `NFT_SENDER_ADDRESS` | unset | Account submitting mint/burn |
//! | `NFT_FROM_BLOCK` | `0` | First block to read logs from |
//! | `NFT_POLL_INTERVAL_MS` | `2000` | Log poll period |
//! | `NFT_RETRY_INITIAL_MS` | `1000` | First bootstrap backoff delay |
//! | `NFT_RETRY_FACTOR` | `5` | Backoff multiplier |
//! | `NFT_RETRY_MAX_ATTEMPTS` | unset (retry forever) | Bootstrap attempt cap |
//! | `NFT_HALT_ON_FETCH_FAILURE` | `false` | Stop on a failed reduction instead of skipping it |
//! | `NFT_METRICS_LOG_INTERVAL_SECS` | `60` | Period of the debug-level metrics dump (`0` disables) |

use std::time::Duration;

use nft_sync::{BackoffPolicy, FetchFailurePolicy, PollerConfig, SyncConfig};
use shared_types::Address;
use thiserror::Error;

/// Default ledger endpoint.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Default period of the metrics dump.
pub const DEFAULT_METRICS_LOG_INTERVAL_SECS: u64 = 60;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{name} has an invalid value {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Ledger JSON-RPC endpoint.
    pub rpc_url: String,
    /// Observed token contract.
    pub contract: Address,
    /// Account used for mint and burn submissions.
    pub sender: Option<Address>,
    /// Log poller settings.
    pub poller: PollerConfig,
    /// Engine settings.
    pub sync: SyncConfig,
    /// Period of the metrics dump; `None` disables it.
    pub metrics_log_interval: Option<Duration>,
}

impl NodeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (variable name to value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract = lookup("NFT_CONTRACT_ADDRESS")
            .ok_or(ConfigError::Missing("NFT_CONTRACT_ADDRESS"))
            .and_then(|value| parse_address("NFT_CONTRACT_ADDRESS", value))?;
        let sender = lookup("NFT_SENDER_ADDRESS")
            .map(|value| parse_address("NFT_SENDER_ADDRESS", value))
            .transpose()?;

        let defaults = BackoffPolicy::default();
        let backoff = BackoffPolicy {
            initial_delay_ms: parse_or(&lookup, "NFT_RETRY_INITIAL_MS", defaults.initial_delay_ms)?,
            factor: parse_or(&lookup, "NFT_RETRY_FACTOR", defaults.factor)?,
            max_delay_ms: defaults.max_delay_ms,
            max_attempts: parse_opt(&lookup, "NFT_RETRY_MAX_ATTEMPTS")?,
        };
        let halt = parse_or(&lookup, "NFT_HALT_ON_FETCH_FAILURE", false)?;

        let poller_defaults = PollerConfig::default();
        let poller = PollerConfig {
            from_block: parse_or(&lookup, "NFT_FROM_BLOCK", poller_defaults.from_block)?,
            interval: Duration::from_millis(parse_or(
                &lookup,
                "NFT_POLL_INTERVAL_MS",
                poller_defaults.interval.as_millis() as u64,
            )?),
            max_block_range: poller_defaults.max_block_range,
        };

        let metrics_secs = parse_or(
            &lookup,
            "NFT_METRICS_LOG_INTERVAL_SECS",
            DEFAULT_METRICS_LOG_INTERVAL_SECS,
        )?;

        Ok(Self {
            rpc_url: lookup("NFT_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            contract,
            sender,
            poller,
            sync: SyncConfig {
                backoff,
                on_fetch_failure: if halt {
                    FetchFailurePolicy::Halt
                } else {
                    FetchFailurePolicy::SkipEvent
                },
            },
            metrics_log_interval: (metrics_secs > 0).then(|| Duration::from_secs(metrics_secs)),
        })
    }
}

fn parse_address(name: &'static str, value: String) -> Result<Address, ConfigError> {
    Address::parse(&value).map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_opt<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}
