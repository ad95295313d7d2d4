//! # Keyed Upsert
//!
//! Insert-or-replace by token id, preserving position on replace.

use crate::domain::TransactionRecord;

/// Return a new collection with `record` upserted by `id`.
///
/// An existing record with the same id is replaced in place (its slot is
/// kept, its fields are fully overwritten). Otherwise `record` is appended.
pub fn upsert_transaction(
    transactions: &[TransactionRecord],
    record: TransactionRecord,
) -> Vec<TransactionRecord> {
    let mut next = transactions.to_vec();
    match next.iter().position(|existing| existing.id == record.id) {
        Some(index) => next[index] = record,
        None => next.push(record),
    }
    next
}
