//! # Domain Module
//!
//! Core domain types for the sync engine.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod metadata;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use metadata::*;
pub use value_objects::*;
