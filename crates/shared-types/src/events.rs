//! # Ledger Events
//!
//! The loosely-typed wire shape emitted by the contract (`RawLedgerEvent`)
//! and the closed union the sync engine reduces over (`LedgerEvent`).
//!
//! ```text
//! { event, address?, transactionHash?, returnValues?: { _from, _to, _tokenId } }
//!                            │
//!                   LedgerEvent::from_raw
//!                            ▼
//!        Seed { .. } | Transfer { .. } | Other { .. }
//! ```
//!
//! `Seed` is synthetic and never produced from the wire.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::{Address, TokenId, TxHash};

/// Event name of the transfer-class contract event.
pub const TRANSFER_EVENT: &str = "Transfer";

/// Indexed arguments of a `Transfer(address,address,uint256)` log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReturnValues {
    /// Previous owner (zero address on mint).
    #[serde(rename = "_from", default)]
    pub from: Option<String>,
    /// New owner (zero address on burn).
    #[serde(rename = "_to", default)]
    pub to: Option<String>,
    /// Token identifier.
    #[serde(rename = "_tokenId", default)]
    pub token_id: Option<String>,
}

/// An event exactly as the ledger reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLedgerEvent {
    /// Event name (e.g. `"Transfer"`).
    pub event: String,
    /// Emitting contract.
    #[serde(default)]
    pub address: Option<String>,
    /// Hash of the transaction that emitted the event.
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Decoded event arguments.
    #[serde(default)]
    pub return_values: Option<RawReturnValues>,
}

/// Event kind discriminant, used for filtering and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Synthetic bootstrap event.
    Seed,
    /// Token transfer (mint, burn, or owner change).
    Transfer,
    /// Anything else the contract emits.
    Other,
}

impl EventKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }
}

/// A ledger event, normalized into a closed set of kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Synthetic initialization event carrying the token's static identity.
    /// Always the first event the reducer sees.
    Seed {
        /// Token name resolved during bootstrap.
        token_name: String,
        /// Token symbol, absent when the lookup failed.
        token_symbol: Option<String>,
        /// Contract address, when known at bootstrap time.
        address: Option<Address>,
    },

    /// A `Transfer` emitted by the contract.
    Transfer {
        /// Emitting contract.
        address: Option<Address>,
        /// Originating transaction.
        transaction_hash: TxHash,
        /// Previous owner.
        from: Address,
        /// New owner.
        to: Address,
        /// Token moved.
        token_id: TokenId,
    },

    /// Any other contract event. Carries only what address capture needs.
    Other {
        /// Original event name.
        name: String,
        /// Emitting contract.
        address: Option<Address>,
    },
}

impl LedgerEvent {
    /// Normalize a wire event.
    ///
    /// A `Transfer` with missing or unparsable fields is downgraded to
    /// `Other` with a warning, so a malformed event never stops the engine.
    #[must_use]
    pub fn from_raw(raw: RawLedgerEvent) -> Self {
        let address = match raw.address.as_deref().filter(|a| !a.is_empty()) {
            Some(a) => match Address::parse(a) {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!(event = %raw.event, error = %e, "Ignoring unparsable event address");
                    None
                }
            },
            None => None,
        };

        if raw.event != TRANSFER_EVENT {
            return Self::Other {
                name: raw.event,
                address,
            };
        }

        match Self::parse_transfer(&raw) {
            Ok((transaction_hash, from, to, token_id)) => Self::Transfer {
                address,
                transaction_hash,
                from,
                to,
                token_id,
            },
            Err(reason) => {
                warn!(reason = %reason, "Malformed Transfer event treated as no-op");
                Self::Other {
                    name: raw.event,
                    address,
                }
            }
        }
    }

    fn parse_transfer(raw: &RawLedgerEvent) -> Result<(TxHash, Address, Address, TokenId), String> {
        let values = raw
            .return_values
            .as_ref()
            .ok_or_else(|| "missing returnValues".to_string())?;
        let hash = raw
            .transaction_hash
            .as_deref()
            .ok_or_else(|| "missing transactionHash".to_string())?;
        let from = values.from.as_deref().ok_or_else(|| "missing _from".to_string())?;
        let to = values.to.as_deref().ok_or_else(|| "missing _to".to_string())?;
        let token_id = values
            .token_id
            .as_deref()
            .ok_or_else(|| "missing _tokenId".to_string())?;

        Ok((
            TxHash::parse(hash).map_err(|e| e.to_string())?,
            Address::parse(from).map_err(|e| e.to_string())?,
            Address::parse(to).map_err(|e| e.to_string())?,
            TokenId::parse(token_id).map_err(|e| e.to_string())?,
        ))
    }

    /// Address carried by this event, if any.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Seed { address, .. }
            | Self::Transfer { address, .. }
            | Self::Other { address, .. } => *address,
        }
    }

    /// Kind discriminant.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Seed { .. } => EventKind::Seed,
            Self::Transfer { .. } => EventKind::Transfer,
            Self::Other { .. } => EventKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x00000000000000000000000000000000000000c0";
    const ALICE: &str = "0x00000000000000000000000000000000000000a1";

    fn raw_transfer() -> RawLedgerEvent {
        RawLedgerEvent {
            event: TRANSFER_EVENT.to_string(),
            address: Some(CONTRACT.to_string()),
            transaction_hash: Some(format!("0x{}", "11".repeat(32))),
            return_values: Some(RawReturnValues {
                from: Some(format!("0x{}", "00".repeat(20))),
                to: Some(ALICE.to_string()),
                token_id: Some("7".to_string()),
            }),
        }
    }

    #[test]
    fn test_transfer_from_raw() {
        let event = LedgerEvent::from_raw(raw_transfer());
        match event {
            LedgerEvent::Transfer {
                address,
                from,
                to,
                token_id,
                ..
            } => {
                assert_eq!(address, Some(Address::parse(CONTRACT).unwrap()));
                assert!(from.is_zero());
                assert_eq!(to, Address::parse(ALICE).unwrap());
                assert_eq!(token_id, TokenId::from(7));
            }
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_return_values_is_other() {
        let mut raw = raw_transfer();
        raw.return_values = None;
        let event = LedgerEvent::from_raw(raw);
        assert_eq!(event.kind(), EventKind::Other);
        // address capture still possible
        assert!(event.address().is_some());
    }

    #[test]
    fn test_bad_token_id_is_other() {
        let mut raw = raw_transfer();
        if let Some(values) = raw.return_values.as_mut() {
            values.token_id = Some("not-a-number".to_string());
        }
        assert_eq!(LedgerEvent::from_raw(raw).kind(), EventKind::Other);
    }

    #[test]
    fn test_unknown_event_is_other() {
        let raw = RawLedgerEvent {
            event: "Approval".to_string(),
            address: None,
            ..Default::default()
        };
        let event = LedgerEvent::from_raw(raw);
        assert_eq!(event.kind(), EventKind::Other);
        assert_eq!(event.address(), None);
    }

    #[test]
    fn test_empty_address_is_absent() {
        let raw = RawLedgerEvent {
            event: "Approval".to_string(),
            address: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(LedgerEvent::from_raw(raw).address(), None);
    }

    #[test]
    fn test_raw_event_json_shape() {
        let json = format!(
            r#"{{"event":"Transfer","address":"{CONTRACT}","transactionHash":"0x{}","returnValues":{{"_from":"{ALICE}","_to":"{ALICE}","_tokenId":"1"}}}}"#,
            "22".repeat(32)
        );
        let raw: RawLedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(raw.event, "Transfer");
        assert_eq!(LedgerEvent::from_raw(raw).kind(), EventKind::Transfer);
    }
}
