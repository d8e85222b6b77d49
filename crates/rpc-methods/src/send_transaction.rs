//! Handler for the `sendTransaction` method.
//!
//! Decodes and hashes the submitted envelope, forwards it to core and
//! classifies core's reply. Client mistakes surface as invalid-params errors;
//! anything that goes wrong on the server side is logged and surfaces as a
//! generic internal error.

use rpc_core_client::{CallContext, CoreClient};
use rpc_ledger::LedgerRangeGetter;
use rpc_types::{messages, RpcError, SendTransactionRequest, SendTransactionResponse, TxStatus};
use std::sync::Arc;
use tracing::instrument;

/// Handler submitting transactions to core.
pub struct SendTransactionHandler {
	/// Client used to reach core, normally the metered decorator.
	core: Arc<dyn CoreClient>,
	/// Source of the ledger snapshot attached to responses.
	ledger_range: Arc<dyn LedgerRangeGetter>,
	/// Passphrase of the network transactions are hashed for.
	network_passphrase: String,
}

impl SendTransactionHandler {
	pub fn new(
		core: Arc<dyn CoreClient>,
		ledger_range: Arc<dyn LedgerRangeGetter>,
		network_passphrase: impl Into<String>,
	) -> Self {
		Self {
			core,
			ledger_range,
			network_passphrase: network_passphrase.into(),
		}
	}

	/// Submits the request's envelope to core and classifies the reply.
	#[instrument(skip_all, fields(hash = tracing::field::Empty))]
	pub async fn handle(
		&self,
		ctx: &CallContext,
		request: SendTransactionRequest,
	) -> Result<SendTransactionResponse, RpcError> {
		let envelope = rpc_xdr::decode_envelope(&request.transaction).map_err(|e| {
			tracing::debug!(error = %e, "Rejected undecodable envelope");
			RpcError::invalid_params(messages::INVALID_XDR)
		})?;

		let hash =
			rpc_xdr::hash_transaction(&envelope, &self.network_passphrase).map_err(|e| {
				tracing::debug!(error = %e, "Could not hash envelope");
				RpcError::invalid_params(messages::INVALID_HASH)
			})?;
		drop(envelope);
		tracing::Span::current().record("hash", tracing::field::display(&hash));

		// Taken before submitting so the snapshot never postdates core's answer.
		let ledger_range = ctx
			.run(self.ledger_range.ledger_range(ctx))
			.await
			.map_err(|e| {
				tracing::error!(
					error = %e,
					tx = %request.transaction,
					"Could not fetch latest ledger range"
				);
				RpcError::internal(messages::SUBMIT_FAILED)
			})?;

		let submitted = ctx
			.run(self.core.submit_transaction(ctx, &request.transaction))
			.await
			.unwrap_or_else(|e| Err(e.into()));
		let response = match submitted {
			Ok(response) => response,
			Err(e) => {
				tracing::error!(
					error = %e,
					tx = %request.transaction,
					"Could not submit transaction to core"
				);
				return Err(RpcError::internal(messages::SUBMIT_FAILED));
			},
		};

		if response.is_exception() {
			tracing::error!(
				exception = %response.exception,
				tx = %request.transaction,
				"Received exception from core"
			);
			return Err(RpcError::internal(messages::CORE_EXCEPTION));
		}

		let status = match response.status.parse::<TxStatus>() {
			Ok(status) => status,
			Err(e) => {
				tracing::error!(
					error = %e,
					status = %response.status,
					tx = %request.transaction,
					"Unrecognized status from core"
				);
				return Err(RpcError::internal(messages::INVALID_STATUS));
			},
		};

		let mut result = SendTransactionResponse {
			error_result_xdr: None,
			diagnostic_events_xdr: None,
			status,
			hash,
			latest_ledger: ledger_range.last_ledger.sequence,
			latest_ledger_close_time: ledger_range.last_ledger.close_time,
		};

		match status {
			TxStatus::Error => {
				let events = rpc_xdr::decode_diagnostic_events(&response.diagnostic_events)
					.map_err(|e| {
						tracing::error!(
							error = %e,
							tx = %request.transaction,
							"Could not decode diagnostic events"
						);
						RpcError::internal(messages::DIAGNOSTICS_UNDECODABLE)
					})?;
				result.error_result_xdr = Some(response.error);
				result.diagnostic_events_xdr = Some(events);
			},
			TxStatus::Pending | TxStatus::Duplicate | TxStatus::TryAgainLater => {},
		}

		tracing::debug!(status = %status, "Transaction submitted");
		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fakes::FakeCore;
	use async_trait::async_trait;
	use rpc_config::{BuildInfo, MetricsConfig};
	use rpc_core_client::MeteredCoreClient;
	use rpc_ledger::implementations::memory::MemoryLedgerStore;
	use rpc_metrics::MetricsRegistry;
	use rpc_types::{
		LedgerCloseMeta, LedgerInfo, LedgerRange, TxResponse, INTERNAL_ERROR, INVALID_PARAMS,
	};
	use rpc_xdr::fixtures;
	use std::time::Duration;
	use tokio::time::Instant;

	const LATEST_SEQUENCE: u32 = 1_234;
	const LATEST_CLOSE_TIME: i64 = 1_700_000_000;

	async fn ledgers() -> Arc<MemoryLedgerStore> {
		let store = MemoryLedgerStore::new(100);
		for sequence in [LATEST_SEQUENCE - 1, LATEST_SEQUENCE] {
			store
				.record_ledger(LedgerCloseMeta {
					info: LedgerInfo {
						sequence,
						close_time: LATEST_CLOSE_TIME - i64::from(LATEST_SEQUENCE - sequence) * 5,
					},
					protocol_version: 21,
					bucket_list_size: 1_000,
				})
				.await;
		}
		Arc::new(store)
	}

	async fn handler(core: Arc<FakeCore>) -> SendTransactionHandler {
		SendTransactionHandler::new(core, ledgers().await, fixtures::PASSPHRASE)
	}

	/// Ledger range source that takes seconds to answer.
	struct SlowLedgerRange;

	#[async_trait]
	impl LedgerRangeGetter for SlowLedgerRange {
		async fn ledger_range(&self, _ctx: &CallContext) -> LedgerRange {
			tokio::time::sleep(Duration::from_secs(3)).await;
			LedgerRange::default()
		}
	}

	fn request(op_count: usize) -> SendTransactionRequest {
		SendTransactionRequest {
			transaction: fixtures::encode_envelope(&fixtures::v1_envelope(op_count)),
		}
	}

	fn expected_hash(request: &SendTransactionRequest) -> rpc_types::TransactionHash {
		let envelope = rpc_xdr::decode_envelope(&request.transaction).unwrap();
		rpc_xdr::hash_transaction(&envelope, fixtures::PASSPHRASE).unwrap()
	}

	#[tokio::test]
	async fn test_pending_reply() {
		let core = Arc::new(FakeCore::with_status("PENDING"));
		let handler = handler(core.clone()).await;
		let request = request(1);

		let response = handler
			.handle(&CallContext::background(), request.clone())
			.await
			.unwrap();

		assert_eq!(response.status, TxStatus::Pending);
		assert_eq!(response.hash, expected_hash(&request));
		assert_eq!(response.latest_ledger, LATEST_SEQUENCE);
		assert_eq!(response.latest_ledger_close_time, LATEST_CLOSE_TIME);
		assert!(response.error_result_xdr.is_none());
		assert!(response.diagnostic_events_xdr.is_none());
		assert_eq!(core.submissions(), vec![request.transaction]);

		let json = serde_json::to_value(&response).unwrap();
		assert_eq!(json["status"], "PENDING");
		assert_eq!(json["latestLedgerCloseTime"], LATEST_CLOSE_TIME.to_string());
		assert!(json.get("errorResultXdr").is_none());
		assert!(json.get("diagnosticEventsXdr").is_none());
	}

	#[tokio::test]
	async fn test_duplicate_and_try_again_later_replies() {
		for (raw, status) in [
			("DUPLICATE", TxStatus::Duplicate),
			("TRY_AGAIN_LATER", TxStatus::TryAgainLater),
		] {
			let handler = handler(Arc::new(FakeCore::with_status(raw))).await;
			let response = handler
				.handle(&CallContext::background(), request(1))
				.await
				.unwrap();
			assert_eq!(response.status, status);
			assert!(response.diagnostic_events_xdr.is_none());
		}
	}

	#[tokio::test]
	async fn test_error_reply_carries_result_and_ordered_diagnostics() {
		let events = vec![
			fixtures::diagnostic_event(1, false),
			fixtures::diagnostic_event(2, true),
			fixtures::diagnostic_event(3, false),
		];
		let expected: Vec<String> = events
			.iter()
			.map(|event| fixtures::encode_diagnostic_events(vec![event.clone()]))
			.map(|array| rpc_xdr::decode_diagnostic_events(&array).unwrap().remove(0))
			.collect();

		let core = Arc::new(FakeCore::replying(TxResponse {
			status: "ERROR".to_string(),
			error: "AAAAAAAAAGT////7AAAAAA==".to_string(),
			diagnostic_events: fixtures::encode_diagnostic_events(events),
			..Default::default()
		}));
		let handler = handler(core).await;

		let response = handler
			.handle(&CallContext::background(), request(2))
			.await
			.unwrap();

		assert_eq!(response.status, TxStatus::Error);
		assert_eq!(
			response.error_result_xdr.as_deref(),
			Some("AAAAAAAAAGT////7AAAAAA==")
		);
		assert_eq!(response.diagnostic_events_xdr, Some(expected));
		assert_eq!(response.latest_ledger, LATEST_SEQUENCE);
	}

	#[tokio::test]
	async fn test_error_reply_without_diagnostics() {
		let core = Arc::new(FakeCore::replying(TxResponse {
			status: "ERROR".to_string(),
			error: "AAAA".to_string(),
			..Default::default()
		}));
		let response = handler(core)
			.await
			.handle(&CallContext::background(), request(1))
			.await
			.unwrap();
		assert_eq!(response.diagnostic_events_xdr, Some(Vec::new()));
	}

	#[tokio::test]
	async fn test_undecodable_diagnostics() {
		let core = Arc::new(FakeCore::replying(TxResponse {
			status: "ERROR".to_string(),
			error: "AAAA".to_string(),
			diagnostic_events: "AAAAAQ==".to_string(),
			..Default::default()
		}));
		let err = handler(core)
			.await
			.handle(&CallContext::background(), request(1))
			.await
			.unwrap_err();
		assert_eq!(err, RpcError::internal(messages::DIAGNOSTICS_UNDECODABLE));
	}

	#[tokio::test]
	async fn test_invalid_envelope_is_not_submitted() {
		let core = Arc::new(FakeCore::with_status("PENDING"));
		let handler = handler(core.clone()).await;

		for transaction in ["", "not base64!", "AAAA"] {
			let err = handler
				.handle(
					&CallContext::background(),
					SendTransactionRequest {
						transaction: transaction.to_string(),
					},
				)
				.await
				.unwrap_err();
			assert_eq!(err.code, INVALID_PARAMS);
			assert_eq!(err.message, messages::INVALID_XDR);
		}
		assert!(core.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_exception_reply() {
		let core = Arc::new(FakeCore::replying(TxResponse {
			exception: "Unexpected error".to_string(),
			status: "PENDING".to_string(),
			..Default::default()
		}));
		let err = handler(core)
			.await
			.handle(&CallContext::background(), request(1))
			.await
			.unwrap_err();
		assert_eq!(err.code, INTERNAL_ERROR);
		assert_eq!(err.message, messages::CORE_EXCEPTION);
	}

	#[tokio::test]
	async fn test_unrecognized_status() {
		for status in ["", "pending", "FROZEN"] {
			let err = handler(Arc::new(FakeCore::with_status(status)))
				.await
				.handle(&CallContext::background(), request(1))
				.await
				.unwrap_err();
			assert_eq!(err, RpcError::internal(messages::INVALID_STATUS));
		}
	}

	#[tokio::test]
	async fn test_transport_failure() {
		let err = handler(Arc::new(FakeCore::failing("connection refused")))
			.await
			.handle(&CallContext::background(), request(1))
			.await
			.unwrap_err();
		assert_eq!(err.code, INTERNAL_ERROR);
		assert_eq!(err.message, messages::SUBMIT_FAILED);
	}

	#[tokio::test]
	async fn test_submissions_are_metered() {
		let registry = MetricsRegistry::new(&MetricsConfig::default(), &BuildInfo::current()).unwrap();
		let pending = SendTransactionHandler::new(
			Arc::new(MeteredCoreClient::new(
				Arc::new(FakeCore::with_status("PENDING")),
				registry.tx_sub_metrics(),
			)),
			ledgers().await,
			fixtures::PASSPHRASE,
		);
		let failing = SendTransactionHandler::new(
			Arc::new(MeteredCoreClient::new(
				Arc::new(FakeCore::failing("connection refused")),
				registry.tx_sub_metrics(),
			)),
			ledgers().await,
			fixtures::PASSPHRASE,
		);

		pending
			.handle(&CallContext::background(), request(2))
			.await
			.unwrap();
		failing
			.handle(&CallContext::background(), request(4))
			.await
			.unwrap_err();

		let output = registry.render().unwrap();
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds_count{status=\"PENDING\"} 1"
		));
		assert!(output.contains("soroban_rpc_txsub_operation_count_sum{status=\"PENDING\"} 2"));
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds_count{status=\"request_error\"} 1"
		));
		assert!(
			output.contains("soroban_rpc_txsub_operation_count_sum{status=\"request_error\"} 4")
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_slow_ledger_range_respects_deadline() {
		let core = Arc::new(FakeCore::with_status("PENDING"));
		let handler =
			SendTransactionHandler::new(core.clone(), Arc::new(SlowLedgerRange), fixtures::PASSPHRASE);

		let ctx = CallContext::with_timeout(Duration::from_millis(200));
		let started = Instant::now();
		let err = handler.handle(&ctx, request(1)).await.unwrap_err();

		assert!(started.elapsed() <= Duration::from_secs(1));
		assert_eq!(err, RpcError::internal(messages::SUBMIT_FAILED));
		assert!(core.submissions().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn test_slow_core_respects_deadline() {
		let registry = MetricsRegistry::new(&MetricsConfig::default(), &BuildInfo::current()).unwrap();
		let slow_core = FakeCore {
			delay: Duration::from_secs(3),
			..FakeCore::with_status("PENDING")
		};
		let handler = SendTransactionHandler::new(
			Arc::new(MeteredCoreClient::new(
				Arc::new(slow_core),
				registry.tx_sub_metrics(),
			)),
			ledgers().await,
			fixtures::PASSPHRASE,
		);

		let ctx = CallContext::with_timeout(Duration::from_millis(200));
		let started = Instant::now();
		let err = handler.handle(&ctx, request(1)).await.unwrap_err();

		assert!(started.elapsed() <= Duration::from_secs(1));
		assert_eq!(err.code, INTERNAL_ERROR);
		assert_eq!(err.message, messages::SUBMIT_FAILED);

		let output = registry.render().unwrap();
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds_count{status=\"request_error\"} 1"
		));
		assert!(!output.contains("status=\"PENDING\""));
	}
}
