//! # Remote Value Fetcher
//!
//! Single-shot read queries against the ledger's current state.
//! No caching, no retry: a failed fetch is returned to the caller.

use async_trait::async_trait;
use shared_types::U256;
use std::sync::Arc;
use tracing::debug;

use crate::algorithms::TotalSupplySource;
use crate::domain::{LedgerQuery, Scalar, SyncError};
use crate::ports::LedgerReader;

/// Typed wrapper around a `LedgerReader`.
pub struct RemoteValueFetcher<L: LedgerReader> {
    ledger: Arc<L>,
}

impl<L: LedgerReader> Clone for RemoteValueFetcher<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: LedgerReader> RemoteValueFetcher<L> {
    /// Create a fetcher over `ledger`.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Issue one query and parse the first value it returns.
    pub async fn fetch_one(&self, query: LedgerQuery) -> Result<Scalar, SyncError> {
        let raw = self
            .ledger
            .call(query)
            .await
            .map_err(|source| SyncError::Fetch { query, source })?;

        let value = Scalar::parse(query, &raw).ok_or(SyncError::UnexpectedValue {
            query,
            value: raw,
        })?;
        debug!(query = %query, value = ?value, "[nft-sync] Fetched");
        Ok(value)
    }

    /// `name()`.
    pub async fn fetch_name(&self) -> Result<String, SyncError> {
        self.fetch_text(LedgerQuery::Name).await
    }

    /// `symbol()`.
    pub async fn fetch_symbol(&self) -> Result<String, SyncError> {
        self.fetch_text(LedgerQuery::Symbol).await
    }

    /// `totalSupply()`.
    pub async fn fetch_total_supply(&self) -> Result<U256, SyncError> {
        let value = self.fetch_one(LedgerQuery::TotalSupply).await?;
        match value {
            Scalar::Integer(supply) => Ok(supply),
            Scalar::Text(text) => Err(SyncError::UnexpectedValue {
                query: LedgerQuery::TotalSupply,
                value: text,
            }),
        }
    }

    async fn fetch_text(&self, query: LedgerQuery) -> Result<String, SyncError> {
        match self.fetch_one(query).await? {
            Scalar::Text(text) => Ok(text),
            Scalar::Integer(value) => Err(SyncError::UnexpectedValue {
                query,
                value: value.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<L: LedgerReader> TotalSupplySource for RemoteValueFetcher<L> {
    async fn total_supply(&self) -> Result<U256, SyncError> {
        self.fetch_total_supply().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockLedger;
    use shared_types::LedgerError;

    #[tokio::test]
    async fn test_fetch_identity() {
        let fetcher = RemoteValueFetcher::new(Arc::new(MockLedger::default()));
        assert_eq!(fetcher.fetch_name().await.unwrap(), "AragonNFT");
        assert_eq!(fetcher.fetch_symbol().await.unwrap(), "ANFT");
    }

    #[tokio::test]
    async fn test_total_supply_parsed_as_integer() {
        let ledger = Arc::new(MockLedger::default());
        ledger.set_supply(3);
        let fetcher = RemoteValueFetcher::new(ledger.clone());

        assert_eq!(
            fetcher.fetch_one(LedgerQuery::TotalSupply).await.unwrap(),
            Scalar::Integer(U256::from(3))
        );
        assert_eq!(fetcher.fetch_total_supply().await.unwrap(), U256::from(3));
        assert_eq!(ledger.call_count(LedgerQuery::TotalSupply), 2);
    }

    #[tokio::test]
    async fn test_failure_propagates_without_retry() {
        let ledger = Arc::new(
            MockLedger::default()
                .with_supply_script(vec![Err(LedgerError::Unreachable("down".to_string()))]),
        );
        let fetcher = RemoteValueFetcher::new(ledger.clone());

        let err = fetcher.fetch_total_supply().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Fetch {
                query: LedgerQuery::TotalSupply,
                ..
            }
        ));
        assert_eq!(ledger.call_count(LedgerQuery::TotalSupply), 1);
    }

    /// Reader answering every query with the same raw string.
    struct FixedReader(&'static str);

    #[async_trait]
    impl LedgerReader for FixedReader {
        async fn call(&self, _query: LedgerQuery) -> Result<String, LedgerError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_total_supply_above_u64() {
        // 2^70
        let fetcher = RemoteValueFetcher::new(Arc::new(FixedReader("1180591620717411303424")));
        assert_eq!(
            fetcher.fetch_total_supply().await.unwrap(),
            (U256::from(u64::MAX) + U256::one()) * U256::from(64)
        );
    }
}
