//! Telemetry configuration from environment variables.

use std::env;

/// Default service name in logs.
pub const DEFAULT_SERVICE_NAME: &str = "nft-sync";

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (`info`, `nft_sync=debug,info`, ...)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON instead of human-readable lines
    pub json_logs: bool,

    /// Network identifier (mainnet, sepolia, devnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

/// Interpret an on/off environment value, falling back to `default`.
pub(crate) fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        _ => default,
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: nft-sync)
    /// - `NFT_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `NFT_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `NFT_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `NFT_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string()),

            log_level: env::var("NFT_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: parse_flag(env::var("NFT_CONSOLE_OUTPUT").ok(), true),

            json_logs: parse_flag(env::var("NFT_JSON_LOGS").ok(), is_container),

            network: env::var("NFT_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }

    /// Service name qualified with the network, as shown in logs.
    pub fn full_service_name(&self) -> String {
        format!("{}@{}", self.service_name, self.network)
    }
}
