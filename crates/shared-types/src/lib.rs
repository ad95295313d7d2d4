//! # Shared Types Crate
//!
//! Ledger-facing primitives shared by the event bus, the sync engine and the
//! node binary.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identity types and the event union live here.
//! - **Closed Event Set**: wire events are normalized once, at the boundary,
//!   into `LedgerEvent`; nothing downstream matches on event-name strings.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
