//! # Ledger Primitives
//!
//! Identity and value types observed on the token ledger.
//!
//! ## Wire Formats
//!
//! - **Address**: `0x` + 40 hex digits, case-insensitive on input, lowercase on output
//! - **TxHash**: `0x` + 64 hex digits
//! - **TokenId**: decimal string or `0x`-prefixed hex, displayed as decimal

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::LedgerError;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// Decode a `0x`-prefixed (or bare) hex string into exactly `N` bytes.
fn decode_fixed<const N: usize>(input: &str) -> Option<[u8; N]> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != N * 2 {
        return None;
    }

    let bytes = hex::decode(digits).ok()?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Some(out)
}

// =============================================================================
// ADDRESS
// =============================================================================

/// A 20-byte account or contract identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Mints originate from it, burns are sent to it.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Parse an address from its hex representation.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        decode_fixed::<20>(input)
            .map(Address)
            .ok_or_else(|| LedgerError::InvalidAddress(input.to_string()))
    }

    /// Take the low 20 bytes of a 32-byte ABI word (indexed log topic, return value).
    #[must_use]
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut out = [0u8; 20];
        out.copy_from_slice(&word[12..]);
        Address(out)
    }

    /// Left-pad the address into a 32-byte ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Is this the zero address?
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(de::Error::custom)
    }
}

// =============================================================================
// TRANSACTION HASH
// =============================================================================

/// A 32-byte hash identifying the transaction that emitted an event.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Parse a transaction hash from its hex representation.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        decode_fixed::<32>(input)
            .map(TxHash)
            .ok_or_else(|| LedgerError::InvalidHash(input.to_string()))
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        write!(f, "TxHash(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TxHash::parse(&raw).map_err(de::Error::custom)
    }
}

// =============================================================================
// TOKEN IDENTIFIER
// =============================================================================

/// A non-fungible token identifier (uint256 on the contract).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenId(pub U256);

impl TokenId {
    /// Parse a token id from a decimal or `0x`-prefixed hex string.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        let trimmed = input.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16).ok(),
            Some(_) => None,
            None => U256::from_dec_str(trimmed).ok(),
        };

        parsed
            .map(TokenId)
            .ok_or_else(|| LedgerError::InvalidTokenId(input.to_string()))
    }

    /// Decode from a 32-byte big-endian ABI word.
    #[must_use]
    pub fn from_word(word: &[u8; 32]) -> Self {
        TokenId(U256::from_big_endian(word))
    }

    /// Encode as a 32-byte big-endian ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        self.0.to_big_endian(&mut word);
        word
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        TokenId(U256::from(value))
    }
}

impl FromStr for TokenId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TokenId::parse(&raw).map_err(de::Error::custom)
    }
}
