//! # Reducer
//!
//! Folds one `LedgerEvent` into the previous snapshot, producing the next.
//!
//! ```text
//! uninitialized (None) ──Seed──▶ seeded ──Transfer/Other──▶ synchronized ─┐
//!                                                              ▲          │
//!                                                              └──────────┘
//! ```
//!
//! The only side effect is the `totalSupply` re-query on transfers. The
//! previous snapshot is never modified; a failed re-query yields no snapshot.

use async_trait::async_trait;
use shared_types::{LedgerEvent, U256};
use tracing::{debug, warn};

use crate::algorithms::upsert::upsert_transaction;
use crate::domain::{
    invariant_order_preserved, invariant_unique_ids, invariant_write_once, Snapshot, SyncError,
    TransactionRecord,
};

/// Source of the authoritative current supply.
#[async_trait]
pub trait TotalSupplySource: Send + Sync {
    /// Query the ledger's current total supply.
    async fn total_supply(&self) -> Result<U256, SyncError>;
}

/// Snapshot reducer.
pub struct Reducer<S> {
    supply: S,
}

impl<S: TotalSupplySource> Reducer<S> {
    /// Create a reducer that re-derives supply from `supply`.
    pub fn new(supply: S) -> Self {
        Self { supply }
    }

    /// Compute the snapshot that follows `prev` after `event`.
    pub async fn reduce(
        &self,
        prev: Option<&Snapshot>,
        event: &LedgerEvent,
    ) -> Result<Snapshot, SyncError> {
        let mut next = prev.cloned().unwrap_or_default();

        // First address seen wins, whatever the event kind
        if next.proxy_address.is_none() {
            if let Some(address) = event.address() {
                debug!(%address, "[nft-sync] Captured proxy address");
                next.proxy_address = Some(address);
            }
        }

        let next = match event {
            LedgerEvent::Seed {
                token_name,
                token_symbol,
                ..
            } => {
                if next.is_seeded() {
                    warn!("[nft-sync] Ignoring repeated seed event");
                    next
                } else {
                    Snapshot {
                        proxy_address: next.proxy_address,
                        token_name: Some(token_name.clone()),
                        token_symbol: token_symbol.clone(),
                        total_supply: U256::zero(),
                        transactions: Vec::new(),
                    }
                }
            }
            LedgerEvent::Transfer {
                transaction_hash,
                from,
                to,
                token_id,
                ..
            } => {
                let total_supply = self.supply.total_supply().await?;
                let record = TransactionRecord {
                    id: *token_id,
                    from: *from,
                    to: *to,
                    transaction_hash: *transaction_hash,
                };
                Snapshot {
                    total_supply,
                    transactions: upsert_transaction(&next.transactions, record),
                    ..next
                }
            }
            LedgerEvent::Other { .. } => next,
        };

        debug_assert!(invariant_unique_ids(&next.transactions));
        if let Some(prev) = prev {
            debug_assert!(invariant_write_once(prev, &next));
            debug_assert!(invariant_order_preserved(prev, &next));
        }

        Ok(next)
    }
}
