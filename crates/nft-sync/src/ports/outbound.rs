//! # Outbound Ports
//!
//! Traits for the ledger the engine observes and the intents it forwards.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, LedgerError, RawLedgerEvent, TokenId, TxHash};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::domain::LedgerQuery;

/// Read side of the ledger - outbound port.
///
/// Single-shot queries against the contract's current state.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Issue one read query and return the first value, unparsed.
    async fn call(&self, query: LedgerQuery) -> Result<String, LedgerError>;

    /// Address of the observed contract, when the adapter knows it up front.
    fn contract_address(&self) -> Option<Address> {
        None
    }
}

/// Write side of the ledger - outbound port.
///
/// Fire-and-forget submissions; effects come back later as events.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Submit `mint(to, token_id)`.
    async fn mint(&self, to: Address, token_id: TokenId) -> Result<TxHash, LedgerError>;

    /// Submit `burn(token_id)`.
    async fn burn(&self, token_id: TokenId) -> Result<TxHash, LedgerError>;
}

/// Historical event source - outbound port.
///
/// Used by the log poller to feed the event bus.
#[async_trait]
pub trait LedgerLogSource: Send + Sync {
    /// Latest block height.
    async fn head(&self) -> Result<u64, LedgerError>;

    /// Contract events in `[from_block, to_block]`, in ledger order.
    async fn events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLedgerEvent>, LedgerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// An intent recorded by `MockLedger`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedIntent {
    /// `mint(to, token_id)`
    Mint {
        /// Recipient
        to: Address,
        /// Token
        token_id: TokenId,
    },
    /// `burn(token_id)`
    Burn {
        /// Token
        token_id: TokenId,
    },
}

/// Scriptable in-memory ledger for tests.
///
/// - `name` fails for the first `failing_name(n)` calls, then succeeds
/// - `symbol` fails when built `without_symbol()`
/// - `totalSupply` pops scripted answers first, then returns the current supply
/// - logs pushed with `push_log` are served by the `LedgerLogSource` side
pub struct MockLedger {
    name: String,
    symbol: Option<String>,
    address: Option<Address>,
    name_failures: AtomicU32,
    supply: AtomicU64,
    supply_script: Mutex<VecDeque<Result<u64, LedgerError>>>,
    calls: Mutex<Vec<LedgerQuery>>,
    intents: Mutex<Vec<RecordedIntent>>,
    logs: Mutex<Vec<(u64, RawLedgerEvent)>>,
    next_tx: AtomicU64,
}

impl MockLedger {
    /// A reachable ledger exposing `name` and `symbol`.
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: Some(symbol.to_string()),
            address: None,
            name_failures: AtomicU32::new(0),
            supply: AtomicU64::new(0),
            supply_script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            intents: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Fail the first `count` name queries as unreachable.
    #[must_use]
    pub fn failing_name(self, count: u32) -> Self {
        self.name_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Make every symbol query fail.
    #[must_use]
    pub fn without_symbol(mut self) -> Self {
        self.symbol = None;
        self
    }

    /// Report `address` as the contract address.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Queue answers for upcoming totalSupply queries.
    #[must_use]
    pub fn with_supply_script(self, script: Vec<Result<u64, LedgerError>>) -> Self {
        self.supply_script.lock().extend(script);
        self
    }

    /// Set the supply returned once the script is drained.
    pub fn set_supply(&self, supply: u64) {
        self.supply.store(supply, Ordering::SeqCst);
    }

    /// Queries issued so far, in order.
    pub fn calls(&self) -> Vec<LedgerQuery> {
        self.calls.lock().clone()
    }

    /// Number of queries of one kind issued so far.
    pub fn call_count(&self, query: LedgerQuery) -> usize {
        self.calls.lock().iter().filter(|q| **q == query).count()
    }

    /// Intents submitted so far, in order.
    pub fn intents(&self) -> Vec<RecordedIntent> {
        self.intents.lock().clone()
    }

    /// Append a log at `block`. Blocks must be pushed in ascending order.
    pub fn push_log(&self, block: u64, event: RawLedgerEvent) {
        self.logs.lock().push((block, event));
    }

    fn next_hash(&self) -> TxHash {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&n.to_be_bytes());
        TxHash(hash)
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new("AragonNFT", "ANFT")
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn call(&self, query: LedgerQuery) -> Result<String, LedgerError> {
        self.calls.lock().push(query);

        match query {
            LedgerQuery::Name => {
                let remaining = self.name_failures.load(Ordering::SeqCst);
                if remaining > 0 {
                    self.name_failures.store(remaining - 1, Ordering::SeqCst);
                    return Err(LedgerError::Unreachable("Mock failure".to_string()));
                }
                Ok(self.name.clone())
            }
            LedgerQuery::Symbol => self
                .symbol
                .clone()
                .ok_or_else(|| LedgerError::EmptyResponse("symbol".to_string())),
            LedgerQuery::TotalSupply => {
                if let Some(scripted) = self.supply_script.lock().pop_front() {
                    return scripted.map(|supply| supply.to_string());
                }
                Ok(self.supply.load(Ordering::SeqCst).to_string())
            }
        }
    }

    fn contract_address(&self) -> Option<Address> {
        self.address
    }
}

#[async_trait]
impl LedgerWriter for MockLedger {
    async fn mint(&self, to: Address, token_id: TokenId) -> Result<TxHash, LedgerError> {
        self.intents.lock().push(RecordedIntent::Mint { to, token_id });
        Ok(self.next_hash())
    }

    async fn burn(&self, token_id: TokenId) -> Result<TxHash, LedgerError> {
        self.intents.lock().push(RecordedIntent::Burn { token_id });
        Ok(self.next_hash())
    }
}

#[async_trait]
impl LedgerLogSource for MockLedger {
    async fn head(&self) -> Result<u64, LedgerError> {
        Ok(self.logs.lock().last().map_or(0, |(block, _)| *block))
    }

    async fn events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLedgerEvent>, LedgerError> {
        Ok(self
            .logs
            .lock()
            .iter()
            .filter(|(block, _)| (from_block..=to_block).contains(block))
            .map(|(_, event)| event.clone())
            .collect())
    }
}
