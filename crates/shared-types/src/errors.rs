//! # Error Types
//!
//! Errors raised at the ledger boundary (parsing, transport, contract calls).

use thiserror::Error;

/// Errors that can occur while talking to, or decoding data from, the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Address is not 20 hex-encoded bytes.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transaction hash is not 32 hex-encoded bytes.
    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),

    /// Token id is neither decimal nor hex.
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    /// The ledger endpoint could not be reached.
    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    /// The ledger answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// The ledger answered but the payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The contract call produced no value.
    #[error("Empty response for {0}")]
    EmptyResponse(String),

    /// The adapter cannot perform this operation as configured.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl LedgerError {
    /// Transient errors are worth retrying (endpoint down, node still booting).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::EmptyResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display() {
        let err = LedgerError::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        };
        assert!(err.to_string().contains("-32000"));
        assert!(err.to_string().contains("reverted"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LedgerError::Unreachable("refused".into()).is_transient());
        assert!(!LedgerError::InvalidAddress("0x".into()).is_transient());
    }
}
