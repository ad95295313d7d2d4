//! # Shared Bus - Ledger Event Transport
//!
//! Carries normalized `LedgerEvent`s from an event source (the log poller, a
//! test harness) to any number of consumers (the sync engine).
//!
//! ```text
//! ┌──────────────┐    publish()     ┌──────────────┐   subscribe()   ┌──────────────┐
//! │ Event source │ ───────────────→ │  Event Bus   │ ──────────────→ │ Sync engine  │
//! └──────────────┘   (waits when    └──────────────┘   one bounded   └──────────────┘
//!                     a mailbox                         mailbox each
//!                     is full)
//! ```
//!
//! Delivery is lossless and in publish order per subscriber. Each
//! subscriber owns a bounded mailbox; `publish` waits for room in every
//! live mailbox, so a slow consumer throttles the source instead of losing
//! events. Dropping a subscription releases any publisher waiting on it.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription};

/// Events buffered per subscriber before `publish` starts waiting.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
