//! # Bootstrap Trigger
//!
//! Resolves the token's static identity and produces the synthetic seed
//! event. The name query is gated by the retry scheduler; the symbol is
//! cosmetic and a failure only leaves it absent.

use tracing::{info, warn};

use crate::algorithms::RetryScheduler;
use crate::application::fetcher::RemoteValueFetcher;
use crate::domain::{SyncError, TokenIdentity};
use crate::ports::LedgerReader;

/// Bootstrap handshake against the ledger.
pub struct Bootstrap<L: LedgerReader> {
    fetcher: RemoteValueFetcher<L>,
    scheduler: RetryScheduler,
}

impl<L: LedgerReader> Bootstrap<L> {
    /// Create a bootstrap over `fetcher`, retrying per `scheduler`.
    pub fn new(fetcher: RemoteValueFetcher<L>, scheduler: RetryScheduler) -> Self {
        Self { fetcher, scheduler }
    }

    /// Resolve the token identity.
    ///
    /// Waits (with backoff) until the ledger answers `name()`. Only fails
    /// when the backoff policy carries an attempt cap.
    pub async fn resolve(&self) -> Result<TokenIdentity, SyncError> {
        let name = self
            .scheduler
            .run(|_| self.fetcher.fetch_name())
            .await?;

        let symbol = match self.fetcher.fetch_symbol().await {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                warn!(error = %e, "[nft-sync] Symbol lookup failed, seeding without it");
                None
            }
        };

        info!(
            name = %name,
            symbol = symbol.as_deref().unwrap_or("-"),
            "[nft-sync] Token identity resolved"
        );
        Ok(TokenIdentity { name, symbol })
    }
}
