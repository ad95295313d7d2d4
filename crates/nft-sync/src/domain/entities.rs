//! # Domain Entities
//!
//! The materialized snapshot and the records it holds.

use serde::{Deserialize, Serialize};
use shared_types::{Address, LedgerEvent, TokenId, TxHash, U256};

/// One token's latest movement, keyed by `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Token identifier (record identity).
    pub id: TokenId,
    /// Previous owner.
    pub from: Address,
    /// Current owner.
    pub to: Address,
    /// Transaction that produced this movement.
    pub transaction_hash: TxHash,
}

impl TransactionRecord {
    /// Was this movement a mint (from the zero address)?
    #[must_use]
    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }

    /// Was this movement a burn (to the zero address)?
    #[must_use]
    pub fn is_burn(&self) -> bool {
        self.to.is_zero()
    }
}

/// The complete application state at a point in time.
///
/// Owned by the state store and shared read-only as `Arc<Snapshot>`; every
/// reduction produces a new value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Observed contract instance. Write-once.
    pub proxy_address: Option<Address>,
    /// Token name. Write-once (seed).
    pub token_name: Option<String>,
    /// Token symbol. Write-once (seed); absent if the lookup failed.
    pub token_symbol: Option<String>,
    /// Supply as last reported by the ledger, as a decimal string on the wire.
    #[serde(with = "decimal_u256")]
    pub total_supply: U256,
    /// Latest movement per token id, in first-appearance order.
    pub transactions: Vec<TransactionRecord>,
}

impl Snapshot {
    /// Has the seed event been folded in?
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.token_name.is_some()
    }

    /// Look up the record for a token id.
    #[must_use]
    pub fn transaction(&self, id: &TokenId) -> Option<&TransactionRecord> {
        self.transactions.iter().find(|record| &record.id == id)
    }

    /// Current owner of a token as far as observed events tell.
    /// Burned tokens have no owner.
    #[must_use]
    pub fn owner_of(&self, id: &TokenId) -> Option<Address> {
        self.transaction(id)
            .filter(|record| !record.is_burn())
            .map(|record| record.to)
    }
}

/// Static token identity resolved during bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenIdentity {
    /// Token name.
    pub name: String,
    /// Token symbol, `None` if the lookup failed.
    pub symbol: Option<String>,
}

impl TokenIdentity {
    /// Build the synthetic seed event for this identity.
    #[must_use]
    pub fn seed_event(&self, address: Option<Address>) -> LedgerEvent {
        LedgerEvent::Seed {
            token_name: self.name.clone(),
            token_symbol: self.symbol.clone(),
            address,
        }
    }
}

/// `U256` amounts serialized as decimal strings, like `TokenId`.
mod decimal_u256 {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use shared_types::U256;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(raw.trim()).map_err(|e| de::Error::custom(format!("{e:?}")))
    }
}
