//! Ledger snapshot types.
//!
//! These describe what the ledger layer knows at a point in time. They are
//! produced by the ledger collaborators and read by the RPC handlers.

use serde::{Deserialize, Serialize};

/// Sequence number and close time of a single ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerInfo {
	/// Ledger sequence number.
	pub sequence: u32,
	/// Unix timestamp (seconds) at which the ledger closed.
	pub close_time: i64,
}

/// Range of ledgers currently retained by the ledger layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerRange {
	/// Oldest retained ledger.
	pub first_ledger: LedgerInfo,
	/// Most recently closed ledger.
	pub last_ledger: LedgerInfo,
}

/// Header-level metadata of a closed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerCloseMeta {
	/// Sequence and close time of the ledger.
	pub info: LedgerInfo,
	/// Protocol version the ledger was closed under.
	pub protocol_version: u32,
	/// Size in bytes of the bucket list after this ledger closed.
	pub bucket_list_size: u64,
}
