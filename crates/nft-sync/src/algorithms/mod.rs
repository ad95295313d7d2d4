//! # Algorithms Module
//!
//! Pure state transitions and the retry loop the bootstrap relies on.

pub mod reducer;
pub mod retry;
pub mod upsert;

pub use reducer::{Reducer, TotalSupplySource};
pub use retry::{RetryHook, RetryScheduler};
pub use upsert::upsert_transaction;
