//! In-memory ledger backend.
//!
//! This module provides a memory-based implementation of the ledger
//! interfaces, holding a bounded window of closed ledgers. It is useful for
//! development and for tests where no persistent ledger database exists.

use crate::{LedgerEntryReadTx, LedgerEntryReader, LedgerError, LedgerRangeGetter, LedgerReader};
use async_trait::async_trait;
use rpc_types::{CallContext, LedgerCloseMeta, LedgerRange};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory ledger store.
///
/// Keeps at most `retention_window` of the most recent ledgers, keyed by
/// sequence. Read transactions capture the latest sequence at open time.
pub struct MemoryLedgerStore {
	/// Retained ledgers protected by a read-write lock.
	ledgers: Arc<RwLock<BTreeMap<u32, LedgerCloseMeta>>>,
	/// Number of ledgers to keep.
	retention_window: u32,
	/// Read transactions opened and not yet released.
	open_read_txs: Arc<AtomicUsize>,
}

impl MemoryLedgerStore {
	/// Creates an empty store retaining up to `retention_window` ledgers.
	pub fn new(retention_window: u32) -> Self {
		Self {
			ledgers: Arc::new(RwLock::new(BTreeMap::new())),
			retention_window: retention_window.max(1),
			open_read_txs: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Records a closed ledger and evicts ledgers outside the retention window.
	pub async fn record_ledger(&self, meta: LedgerCloseMeta) {
		let mut ledgers = self.ledgers.write().await;
		ledgers.insert(meta.info.sequence, meta);

		let Some(latest) = ledgers.keys().next_back().copied() else {
			return;
		};
		let oldest_kept = latest.saturating_sub(self.retention_window - 1);
		*ledgers = ledgers.split_off(&oldest_kept);
	}

	/// Number of read transactions not yet released.
	pub fn open_read_transactions(&self) -> usize {
		self.open_read_txs.load(Ordering::SeqCst)
	}
}

impl Default for MemoryLedgerStore {
	fn default() -> Self {
		Self::new(17_280)
	}
}

#[async_trait]
impl LedgerRangeGetter for MemoryLedgerStore {
	async fn ledger_range(&self, _ctx: &CallContext) -> LedgerRange {
		let ledgers = self.ledgers.read().await;
		let info = |entry: Option<(&u32, &LedgerCloseMeta)>| {
			entry.map(|(_, meta)| meta.info).unwrap_or_default()
		};
		LedgerRange {
			first_ledger: info(ledgers.iter().next()),
			last_ledger: info(ledgers.iter().next_back()),
		}
	}
}

#[async_trait]
impl LedgerEntryReader for MemoryLedgerStore {
	async fn new_read_tx(
		&self,
		_ctx: &CallContext,
	) -> Result<Box<dyn LedgerEntryReadTx>, LedgerError> {
		let latest = self.ledgers.read().await.keys().next_back().copied();
		self.open_read_txs.fetch_add(1, Ordering::SeqCst);
		Ok(Box::new(MemoryReadTx {
			latest,
			open_read_txs: Arc::clone(&self.open_read_txs),
		}))
	}
}

#[async_trait]
impl LedgerReader for MemoryLedgerStore {
	async fn get_ledger(
		&self,
		_ctx: &CallContext,
		sequence: u32,
	) -> Result<Option<LedgerCloseMeta>, LedgerError> {
		Ok(self.ledgers.read().await.get(&sequence).cloned())
	}
}

/// Read transaction over a [`MemoryLedgerStore`] snapshot.
struct MemoryReadTx {
	latest: Option<u32>,
	open_read_txs: Arc<AtomicUsize>,
}

#[async_trait]
impl LedgerEntryReadTx for MemoryReadTx {
	async fn latest_ledger_sequence(&self, _ctx: &CallContext) -> Result<u32, LedgerError> {
		self.latest.ok_or(LedgerError::Empty)
	}

	fn done(self: Box<Self>) -> Result<(), LedgerError> {
		self.open_read_txs.fetch_sub(1, Ordering::SeqCst);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rpc_types::LedgerInfo;

	fn ctx() -> CallContext {
		CallContext::background()
	}

	fn meta(sequence: u32) -> LedgerCloseMeta {
		LedgerCloseMeta {
			info: LedgerInfo {
				sequence,
				close_time: 1_700_000_000 + i64::from(sequence) * 5,
			},
			protocol_version: 21,
			bucket_list_size: u64::from(sequence) * 100,
		}
	}

	#[tokio::test]
	async fn test_empty_store_range() {
		let store = MemoryLedgerStore::new(5);
		assert_eq!(store.ledger_range(&ctx()).await, LedgerRange::default());
	}

	#[tokio::test]
	async fn test_retention_window_evicts_old_ledgers() {
		let store = MemoryLedgerStore::new(3);
		for sequence in 1..=5 {
			store.record_ledger(meta(sequence)).await;
		}

		let range = store.ledger_range(&ctx()).await;
		assert_eq!(range.first_ledger.sequence, 3);
		assert_eq!(range.last_ledger.sequence, 5);
		assert_eq!(range.last_ledger.close_time, 1_700_000_025);
		assert!(store.get_ledger(&ctx(), 2).await.unwrap().is_none());
		assert_eq!(store.get_ledger(&ctx(), 4).await.unwrap(), Some(meta(4)));
	}

	#[tokio::test]
	async fn test_read_tx_is_a_snapshot() {
		let store = MemoryLedgerStore::new(10);
		store.record_ledger(meta(7)).await;

		let tx = store.new_read_tx(&ctx()).await.unwrap();
		store.record_ledger(meta(8)).await;

		assert_eq!(tx.latest_ledger_sequence(&ctx()).await.unwrap(), 7);
		assert_eq!(store.open_read_transactions(), 1);
		tx.done().unwrap();
		assert_eq!(store.open_read_transactions(), 0);
	}

	#[tokio::test]
	async fn test_read_tx_on_empty_store() {
		let store = MemoryLedgerStore::new(10);
		let tx = store.new_read_tx(&ctx()).await.unwrap();
		assert!(matches!(
			tx.latest_ledger_sequence(&ctx()).await,
			Err(LedgerError::Empty)
		));
		tx.done().unwrap();
	}
}
