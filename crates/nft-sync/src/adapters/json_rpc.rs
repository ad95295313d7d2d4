//! # JSON-RPC Ledger Adapter
//!
//! Talks to an Ethereum-compatible node over HTTP JSON-RPC:
//! - `eth_call` for `name()`, `symbol()`, `totalSupply()`
//! - `eth_sendTransaction` for `mint` and `burn`
//! - `eth_blockNumber` and `eth_getLogs` for the log poller

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use shared_types::{
    Address, LedgerError, RawLedgerEvent, RawReturnValues, TokenId, TxHash, TRANSFER_EVENT,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use crate::adapters::abi::{
    decode_string, decode_uint, encode_call, event_topic, format_quantity, from_hex,
    parse_quantity, to_hex, uint_word, BURN_SIGNATURE, MINT_SIGNATURE, TRANSFER_SIGNATURE,
};
use crate::domain::LedgerQuery;
use crate::ports::{LedgerLogSource, LedgerReader, LedgerWriter};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A log entry as returned by `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    /// Emitting contract.
    pub address: String,
    /// Topic 0 is the event signature hash, the rest are indexed arguments.
    pub topics: Vec<String>,
    /// Non-indexed arguments.
    #[serde(default)]
    pub data: String,
    /// Block height, hex quantity.
    #[serde(default)]
    pub block_number: Option<String>,
    /// Position within the block, hex quantity.
    #[serde(default)]
    pub log_index: Option<String>,
    /// Emitting transaction.
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl RpcLog {
    /// (block, index) position used to order logs.
    fn position(&self) -> (u64, u64) {
        let quantity = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| parse_quantity(v).ok())
                .unwrap_or(0)
        };
        (quantity(&self.block_number), quantity(&self.log_index))
    }
}

fn topic_word(topic: &str) -> Result<[u8; 32], LedgerError> {
    let bytes = from_hex(topic)?;
    bytes
        .try_into()
        .map_err(|_| LedgerError::Decode(format!("topic is not 32 bytes: {topic}")))
}

/// Turn a `Transfer(address,address,uint256)` log into the wire event shape.
///
/// The token id is read from topic 3 (ERC-721, indexed) or from the data
/// word (ERC-20 layout). Logs with another signature keep their topic as
/// the event name and reduce as no-ops.
pub fn decode_transfer_log(log: &RpcLog) -> Result<RawLedgerEvent, LedgerError> {
    let transfer_topic = event_topic(TRANSFER_SIGNATURE);
    let signature = log
        .topics
        .first()
        .ok_or_else(|| LedgerError::Decode("log without topics".to_string()))?;

    if topic_word(signature)? != transfer_topic {
        return Ok(RawLedgerEvent {
            event: signature.clone(),
            address: Some(log.address.clone()),
            transaction_hash: log.transaction_hash.clone(),
            return_values: None,
        });
    }

    let indexed = |index: usize| {
        log.topics
            .get(index)
            .ok_or_else(|| LedgerError::Decode(format!("Transfer log missing topic {index}")))
            .and_then(|topic| topic_word(topic))
    };

    let from = Address::from_word(&indexed(1)?);
    let to = Address::from_word(&indexed(2)?);
    let token_id = match log.topics.get(3) {
        Some(topic) => TokenId::from_word(&topic_word(topic)?),
        None => TokenId(decode_uint(&log.data)?),
    };

    Ok(RawLedgerEvent {
        event: TRANSFER_EVENT.to_string(),
        address: Some(log.address.clone()),
        transaction_hash: log.transaction_hash.clone(),
        return_values: Some(RawReturnValues {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            token_id: Some(token_id.to_string()),
        }),
    })
}

/// Ledger adapter over an HTTP JSON-RPC endpoint.
pub struct JsonRpcLedger {
    http_client: reqwest::Client,
    rpc_url: String,
    contract: Address,
    sender: Option<Address>,
    request_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create an adapter for `contract` behind `rpc_url`.
    pub fn new(rpc_url: impl Into<String>, contract: Address) -> Self {
        Self::with_timeout(rpc_url, contract, DEFAULT_TIMEOUT_SECS)
    }

    /// Create an adapter with a custom request timeout.
    pub fn with_timeout(rpc_url: impl Into<String>, contract: Address, timeout_secs: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            rpc_url: rpc_url.into(),
            contract,
            sender: None,
            request_id: AtomicU64::new(1),
        }
    }

    /// Account used as `from` for mint and burn submissions.
    #[must_use]
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Endpoint URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Make a JSON-RPC call.
    async fn request<P: Serialize + Send, R: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, LedgerError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        trace!(method, id, "[nft-rpc] Request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Unreachable(e.to_string()))?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(format!("{method}: {e}")))?;

        if let Some(error) = rpc_response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| LedgerError::EmptyResponse(method.to_string()))
    }

    async fn send_transaction(&self, data: String) -> Result<TxHash, LedgerError> {
        let sender = self.sender.ok_or_else(|| {
            LedgerError::Unsupported("no sender account configured for submissions".to_string())
        })?;
        let tx = json!({
            "from": sender.to_string(),
            "to": self.contract.to_string(),
            "data": data,
        });

        let hash: String = self.request("eth_sendTransaction", [tx]).await?;
        TxHash::parse(&hash)
    }
}

#[async_trait]
impl LedgerReader for JsonRpcLedger {
    async fn call(&self, query: LedgerQuery) -> Result<String, LedgerError> {
        let call = json!({
            "to": self.contract.to_string(),
            "data": encode_call(query.signature(), &[]),
        });
        let data: String = self.request("eth_call", (call, "latest")).await?;
        debug!(query = %query, bytes = data.len().saturating_sub(2) / 2, "[nft-rpc] eth_call");

        if query.is_integer() {
            decode_uint(&data).map(|value| value.to_string())
        } else {
            decode_string(&data)
        }
    }

    fn contract_address(&self) -> Option<Address> {
        Some(self.contract)
    }
}

#[async_trait]
impl LedgerWriter for JsonRpcLedger {
    async fn mint(&self, to: Address, token_id: TokenId) -> Result<TxHash, LedgerError> {
        let data = encode_call(MINT_SIGNATURE, &[to.to_word(), token_id.to_word()]);
        self.send_transaction(data).await
    }

    async fn burn(&self, token_id: TokenId) -> Result<TxHash, LedgerError> {
        let data = encode_call(BURN_SIGNATURE, &[uint_word(token_id.0)]);
        self.send_transaction(data).await
    }
}

#[async_trait]
impl LedgerLogSource for JsonRpcLedger {
    async fn head(&self) -> Result<u64, LedgerError> {
        let result: String = self.request("eth_blockNumber", Vec::<()>::new()).await?;
        parse_quantity(&result)
    }

    async fn events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLedgerEvent>, LedgerError> {
        let filter = json!({
            "address": self.contract.to_string(),
            "fromBlock": format_quantity(from_block),
            "toBlock": format_quantity(to_block),
            "topics": [to_hex(&event_topic(TRANSFER_SIGNATURE))],
        });
        let mut logs: Vec<RpcLog> = self.request("eth_getLogs", [filter]).await?;
        logs.sort_by_key(RpcLog::position);

        logs.iter().map(decode_transfer_log).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::LedgerEvent;

    fn padded(address: &str) -> String {
        format!("0x{:0>64}", address.trim_start_matches("0x"))
    }

    fn transfer_log(token_id: u64, block: u64, index: u64) -> RpcLog {
        RpcLog {
            address: "0x00000000000000000000000000000000000000cc".to_string(),
            topics: vec![
                to_hex(&event_topic(TRANSFER_SIGNATURE)),
                padded("0000000000000000000000000000000000000000"),
                padded("00000000000000000000000000000000000000aa"),
                to_hex(&uint_word(token_id.into())),
            ],
            data: "0x".to_string(),
            block_number: Some(format_quantity(block)),
            log_index: Some(format_quantity(index)),
            transaction_hash: Some(format!("0x{}", "ab".repeat(32))),
        }
    }

    #[test]
    fn test_decode_erc721_transfer() {
        let raw = decode_transfer_log(&transfer_log(7, 1, 0)).unwrap();
        assert_eq!(raw.event, TRANSFER_EVENT);

        match LedgerEvent::from_raw(raw) {
            LedgerEvent::Transfer {
                address,
                from,
                to,
                token_id,
                ..
            } => {
                assert_eq!(address, Some(Address([0xcc; 20])));
                assert!(from.is_zero());
                assert_eq!(to, Address::parse("0x00000000000000000000000000000000000000aa").unwrap());
                assert_eq!(token_id, TokenId::from(7));
            }
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_token_id_from_data() {
        let mut log = transfer_log(0, 1, 0);
        log.topics.truncate(3);
        log.data = to_hex(&uint_word(9u64.into()));

        let raw = decode_transfer_log(&log).unwrap();
        let values = raw.return_values.unwrap();
        assert_eq!(values.token_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_missing_topic_is_error() {
        let mut log = transfer_log(1, 1, 0);
        log.topics.truncate(2);
        assert!(matches!(decode_transfer_log(&log), Err(LedgerError::Decode(_))));
    }

    #[test]
    fn test_other_signature_passes_through() {
        let mut log = transfer_log(1, 1, 0);
        log.topics[0] = to_hex(&event_topic("Approval(address,address,uint256)"));

        let raw = decode_transfer_log(&log).unwrap();
        assert_ne!(raw.event, TRANSFER_EVENT);
        assert!(matches!(LedgerEvent::from_raw(raw), LedgerEvent::Other { .. }));
    }

    #[test]
    fn test_log_ordering_by_block_then_index() {
        let mut logs = vec![
            transfer_log(3, 2, 0),
            transfer_log(2, 1, 5),
            transfer_log(1, 1, 1),
        ];
        logs.sort_by_key(RpcLog::position);
        let positions: Vec<_> = logs.iter().map(RpcLog::position).collect();
        assert_eq!(positions, vec![(1, 1), (1, 5), (2, 0)]);
    }

    #[test]
    fn test_log_deserializes_from_node_json() {
        let json = r#"{
            "address": "0x00000000000000000000000000000000000000cc",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x",
            "blockNumber": "0x10",
            "logIndex": "0x2",
            "transactionHash": "0x01"
        }"#;
        let log: RpcLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.position(), (16, 2));
    }

    #[tokio::test]
    async fn test_submission_without_sender_is_unsupported() {
        let ledger = JsonRpcLedger::new("http://127.0.0.1:1", Address([0xcc; 20]));
        let result = ledger.burn(TokenId::from(1)).await;
        assert!(matches!(result, Err(LedgerError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let ledger = JsonRpcLedger::with_timeout("http://127.0.0.1:1", Address([0xcc; 20]), 1);
        let result = ledger.call(LedgerQuery::Name).await;
        assert!(matches!(result, Err(LedgerError::Unreachable(_))));
        assert_eq!(ledger.contract_address(), Some(Address([0xcc; 20])));
    }
}
