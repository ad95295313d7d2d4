//! # Contract ABI Helpers
//!
//! Minimal Solidity ABI encoding for the handful of calls and logs the
//! ledger adapter needs: 4-byte selectors, 32-byte words, `string` and
//! `uint256` return values.

use sha3::{Digest, Keccak256};
use shared_types::{LedgerError, U256};

/// Size of one ABI word.
pub const WORD: usize = 32;

/// `Transfer(address,address,uint256)`
pub const TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// `mint(address,uint256)`
pub const MINT_SIGNATURE: &str = "mint(address,uint256)";

/// `burn(uint256)`
pub const BURN_SIGNATURE: &str = "burn(uint256)";

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Function selector: first 4 bytes of the signature hash.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Event topic 0: the full signature hash.
#[must_use]
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// Encode call data as a `0x` hex string: selector followed by static words.
#[must_use]
pub fn encode_call(signature: &str, args: &[[u8; 32]]) -> String {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    to_hex(&data)
}

/// `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed (or bare) hex.
pub fn from_hex(data: &str) -> Result<Vec<u8>, LedgerError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| LedgerError::Decode(format!("bad hex {data:?}: {e}")))
}

/// Parse a `0x` hex quantity (block numbers, counters).
pub fn parse_quantity(data: &str) -> Result<u64, LedgerError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    u64::from_str_radix(digits, 16)
        .map_err(|e| LedgerError::Decode(format!("bad quantity {data:?}: {e}")))
}

/// Format a `0x` hex quantity.
#[must_use]
pub fn format_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Left-pad a `uint256` into a word.
#[must_use]
pub fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Read the word at `index` of `bytes`.
fn word_at(bytes: &[u8], index: usize) -> Result<&[u8], LedgerError> {
    let start = index * WORD;
    bytes
        .get(start..start + WORD)
        .ok_or_else(|| LedgerError::Decode(format!("return data too short for word {index}")))
}

/// Read a word as a `usize` offset or length.
fn word_as_usize(word: &[u8]) -> Result<usize, LedgerError> {
    let value = U256::from_big_endian(word);
    if value > U256::from(u32::MAX) {
        return Err(LedgerError::Decode(format!("length out of range: {value}")));
    }
    Ok(value.as_usize())
}

/// Decode a single `uint256` return value.
pub fn decode_uint(data: &str) -> Result<U256, LedgerError> {
    let bytes = from_hex(data)?;
    if bytes.is_empty() {
        return Err(LedgerError::EmptyResponse("uint256".to_string()));
    }
    Ok(U256::from_big_endian(word_at(&bytes, 0)?))
}

/// Decode a single dynamic `string` return value.
pub fn decode_string(data: &str) -> Result<String, LedgerError> {
    let bytes = from_hex(data)?;
    if bytes.is_empty() {
        return Err(LedgerError::EmptyResponse("string".to_string()));
    }

    let offset = word_as_usize(word_at(&bytes, 0)?)?;
    let length_word = bytes
        .get(offset..offset + WORD)
        .ok_or_else(|| LedgerError::Decode(format!("string offset {offset} out of range")))?;
    let length = word_as_usize(length_word)?;

    let start = offset + WORD;
    let raw = bytes
        .get(start..start + length)
        .ok_or_else(|| LedgerError::Decode(format!("string length {length} out of range")))?;

    String::from_utf8(raw.to_vec()).map_err(|e| LedgerError::Decode(e.to_string()))
}
