//! # Value Objects
//!
//! Read queries against the ledger and the scalars they resolve to.

use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::fmt;

/// A single-shot read query against the contract's current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerQuery {
    /// `name()`
    Name,
    /// `symbol()`
    Symbol,
    /// `totalSupply()`
    TotalSupply,
}

impl LedgerQuery {
    /// Query name as the contract exposes it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::TotalSupply => "totalSupply",
        }
    }

    /// Solidity function signature used to derive the call selector.
    #[must_use]
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Name => "name()",
            Self::Symbol => "symbol()",
            Self::TotalSupply => "totalSupply()",
        }
    }

    /// Does this query return an integer-like aggregate?
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::TotalSupply)
    }
}

impl fmt::Display for LedgerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value resolved from a ledger query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scalar {
    /// Free text (name, symbol).
    Text(String),
    /// Integer aggregate (total supply), a `uint256` on the contract.
    Integer(U256),
}

impl Scalar {
    /// Parse the raw first value of `query`.
    ///
    /// Integer-like queries accept decimal or `0x` hex; anything else is text.
    #[must_use]
    pub fn parse(query: LedgerQuery, raw: &str) -> Option<Self> {
        if !query.is_integer() {
            return Some(Self::Text(raw.to_string()));
        }

        let trimmed = raw.trim();
        let parsed = match trimmed.strip_prefix("0x") {
            Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16).ok(),
            Some(_) => None,
            None => U256::from_dec_str(trimmed).ok(),
        };
        parsed.map(Self::Integer)
    }

    /// Text payload, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(_) => None,
        }
    }

    /// Integer payload, if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<U256> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_names() {
        assert_eq!(LedgerQuery::Name.to_string(), "name");
        assert_eq!(LedgerQuery::TotalSupply.as_str(), "totalSupply");
        assert_eq!(LedgerQuery::Symbol.signature(), "symbol()");
    }

    #[test]
    fn test_parse_integer_decimal_and_hex() {
        assert_eq!(
            Scalar::parse(LedgerQuery::TotalSupply, "42"),
            Some(Scalar::Integer(U256::from(42)))
        );
        assert_eq!(
            Scalar::parse(LedgerQuery::TotalSupply, "0x2a"),
            Some(Scalar::Integer(U256::from(42)))
        );
        assert_eq!(Scalar::parse(LedgerQuery::TotalSupply, "lots"), None);
        assert_eq!(Scalar::parse(LedgerQuery::TotalSupply, "0x"), None);
    }

    #[test]
    fn test_parse_integer_beyond_u64() {
        // 2^64 and the uint256 maximum both fit
        let above = Scalar::parse(LedgerQuery::TotalSupply, "18446744073709551616").unwrap();
        assert_eq!(above.as_integer(), Some(U256::from(u64::MAX) + U256::one()));

        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(
            Scalar::parse(LedgerQuery::TotalSupply, &max).and_then(|s| s.as_integer()),
            Some(U256::max_value())
        );
    }

    #[test]
    fn test_parse_text_keeps_raw() {
        let value = Scalar::parse(LedgerQuery::Name, "42").unwrap();
        assert_eq!(value.as_text(), Some("42"));
        assert_eq!(value.as_integer(), None);
    }
}
