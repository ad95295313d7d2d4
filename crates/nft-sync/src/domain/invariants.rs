//! # Domain Invariants
//!
//! Rules every published snapshot satisfies.

use std::collections::HashSet;

use super::entities::{Snapshot, TransactionRecord};

/// Initial bootstrap retry delay in milliseconds.
pub const DEFAULT_RETRY_INITIAL_MS: u64 = 1000;

/// Bootstrap retry delay multiplier.
pub const DEFAULT_RETRY_FACTOR: u32 = 5;

/// Invariant: at most one record per token id.
pub fn invariant_unique_ids(transactions: &[TransactionRecord]) -> bool {
    let mut seen = HashSet::with_capacity(transactions.len());
    transactions.iter().all(|record| seen.insert(record.id))
}

/// Invariant: write-once fields never change once set.
///
/// `proxy_address`, `token_name` and `token_symbol` of `next` must equal
/// those of `prev` whenever `prev` had them.
pub fn invariant_write_once(prev: &Snapshot, next: &Snapshot) -> bool {
    let address_kept = prev.proxy_address.is_none() || prev.proxy_address == next.proxy_address;
    let identity_kept = !prev.is_seeded()
        || (prev.token_name == next.token_name && prev.token_symbol == next.token_symbol);
    address_kept && identity_kept
}

/// Invariant: records present in `prev` keep their relative order in `next`.
pub fn invariant_order_preserved(prev: &Snapshot, next: &Snapshot) -> bool {
    let next_ids: Vec<_> = next.transactions.iter().map(|record| record.id).collect();
    prev.transactions
        .iter()
        .enumerate()
        .all(|(index, record)| next_ids.get(index) == Some(&record.id))
}
