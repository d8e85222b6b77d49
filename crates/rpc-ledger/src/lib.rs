//! Ledger access module for the RPC service.
//!
//! This module defines the interfaces through which RPC handlers read ledger
//! state: the latest known ledger range, scoped read transactions over ledger
//! entries, and closed ledger metadata. Ingestion is not part of these
//! interfaces; backends are populated by whatever owns them.
//!
//! Every method takes the caller's [`CallContext`]. Handlers bound each call
//! by its deadline, so backends that cannot block may ignore it.

use async_trait::async_trait;
use rpc_types::{CallContext, DeadlineExceeded, LedgerCloseMeta, LedgerRange};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during ledger reads.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// No ledger has been recorded yet.
	#[error("No ledgers available")]
	Empty,
	/// The requested ledger is not retained.
	#[error("Ledger {0} not found")]
	NotFound(u32),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// The caller's deadline passed before the backend answered.
	#[error(transparent)]
	Deadline(#[from] DeadlineExceeded),
}

/// Supplies the range of ledgers currently known.
///
/// Each call is an independent, atomic snapshot. Implementations are
/// responsible for their own synchronization.
#[async_trait]
pub trait LedgerRangeGetter: Send + Sync {
	/// Returns the first and last ledger currently retained.
	async fn ledger_range(&self, ctx: &CallContext) -> LedgerRange;
}

/// Opens scoped read transactions over ledger entries.
#[async_trait]
pub trait LedgerEntryReader: Send + Sync {
	/// Starts a read transaction pinned to the current ledger state.
	async fn new_read_tx(
		&self,
		ctx: &CallContext,
	) -> Result<Box<dyn LedgerEntryReadTx>, LedgerError>;
}

/// A read transaction against ledger entries.
///
/// Holders must call [`LedgerEntryReadTx::done`] exactly once on every path.
#[async_trait]
pub trait LedgerEntryReadTx: Send + Sync {
	/// Sequence of the latest ledger visible to this transaction.
	async fn latest_ledger_sequence(&self, ctx: &CallContext) -> Result<u32, LedgerError>;

	/// Releases the transaction.
	fn done(self: Box<Self>) -> Result<(), LedgerError>;
}

/// Reads metadata of closed ledgers.
#[async_trait]
pub trait LedgerReader: Send + Sync {
	/// Returns the metadata of the ledger with the given sequence, if retained.
	async fn get_ledger(
		&self,
		ctx: &CallContext,
		sequence: u32,
	) -> Result<Option<LedgerCloseMeta>, LedgerError>;
}

/// Returns the bucket list size and protocol version recorded for a ledger.
///
/// The lookup is bounded by the context's deadline.
pub async fn bucket_list_size_and_protocol_version(
	reader: &dyn LedgerReader,
	ctx: &CallContext,
	sequence: u32,
) -> Result<(u64, u32), LedgerError> {
	let meta = ctx
		.run(reader.get_ledger(ctx, sequence))
		.await??
		.ok_or(LedgerError::NotFound(sequence))?;
	Ok((meta.bucket_list_size, meta.protocol_version))
}
