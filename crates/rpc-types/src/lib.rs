//! Common types module for the transaction submission service.
//!
//! This module defines the data types shared between the RPC handlers,
//! the core client and the ledger layer. It provides a centralized location
//! for these types so every crate agrees on their shape and wire format.

/// API types for JSON-RPC requests, responses and errors.
pub mod api;
/// Per-call deadlines.
pub mod context;
/// Ledger snapshot types.
pub mod ledger;
/// Types describing replies from the core validator process.
pub mod submission;
/// Transaction identifiers.
pub mod transaction;

// Re-export all types for convenient access
pub use api::*;
pub use context::*;
pub use ledger::*;
pub use submission::*;
pub use transaction::*;
