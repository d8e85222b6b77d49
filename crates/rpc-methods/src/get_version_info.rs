//! Handler for the `getVersionInfo` method.

use rpc_config::BuildInfo;
use rpc_core_client::{CallContext, CoreClient};
use rpc_ledger::{bucket_list_size_and_protocol_version, LedgerEntryReader, LedgerReader};
use rpc_types::GetVersionInfoResponse;
use std::sync::Arc;
use tracing::instrument;

/// Handler reporting build identifiers and protocol version.
///
/// Every sub-query is best effort: a failing one is logged and its field is
/// left empty, so the method itself never fails. All sub-queries share the
/// caller's deadline.
pub struct GetVersionInfoHandler {
	core: Arc<dyn CoreClient>,
	entry_reader: Arc<dyn LedgerEntryReader>,
	ledger_reader: Arc<dyn LedgerReader>,
	build: BuildInfo,
}

impl GetVersionInfoHandler {
	pub fn new(
		core: Arc<dyn CoreClient>,
		entry_reader: Arc<dyn LedgerEntryReader>,
		ledger_reader: Arc<dyn LedgerReader>,
		build: BuildInfo,
	) -> Self {
		Self {
			core,
			entry_reader,
			ledger_reader,
			build,
		}
	}

	#[instrument(skip_all)]
	pub async fn handle(&self, ctx: &CallContext) -> GetVersionInfoResponse {
		let mut response = GetVersionInfoResponse {
			version: self.build.version.clone(),
			commit_hash: self.build.commit_hash.clone(),
			build_time_stamp: self.build.build_timestamp.clone(),
			..Default::default()
		};

		let info = ctx
			.run(self.core.info(ctx))
			.await
			.unwrap_or_else(|e| Err(e.into()));
		match info {
			Ok(info) => response.captive_core_version = info.info.build,
			Err(e) => tracing::info!(error = %e, "Could not fetch captive core version"),
		}

		if let Some(protocol_version) = self.protocol_version(ctx).await {
			response.protocol_version = protocol_version;
		}

		response
	}

	async fn protocol_version(&self, ctx: &CallContext) -> Option<u32> {
		let read_tx = ctx
			.run(self.entry_reader.new_read_tx(ctx))
			.await
			.unwrap_or_else(|e| Err(e.into()));
		let read_tx = match read_tx {
			Ok(read_tx) => read_tx,
			Err(e) => {
				tracing::info!(error = %e, "Could not open ledger read transaction");
				return None;
			},
		};
		let read_tx = scopeguard::guard(read_tx, |read_tx| {
			if let Err(e) = read_tx.done() {
				tracing::info!(error = %e, "Could not release ledger read transaction");
			}
		});

		let sequence = ctx
			.run(read_tx.latest_ledger_sequence(ctx))
			.await
			.unwrap_or_else(|e| Err(e.into()));
		let sequence = match sequence {
			Ok(sequence) => sequence,
			Err(e) => {
				tracing::info!(error = %e, "Could not read latest ledger sequence");
				return None;
			},
		};

		match bucket_list_size_and_protocol_version(self.ledger_reader.as_ref(), ctx, sequence).await
		{
			Ok((_, protocol_version)) => Some(protocol_version),
			Err(e) => {
				tracing::info!(
					error = %e,
					sequence,
					"Could not read protocol version of latest ledger"
				);
				None
			},
		}
	}
}
