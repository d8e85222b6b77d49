//! Metrics-recording core client decorator.

use crate::{CallContext, CoreClient, CoreClientError};
use async_trait::async_trait;
use rpc_metrics::TxSubMetrics;
use rpc_types::{CoreInfo, SubmissionOutcome, TxResponse};
use std::sync::Arc;
use tokio::time::Instant;

/// Wraps a core client and records one observation per submission.
///
/// Results from the wrapped client are returned unchanged. The observation
/// is recorded even when the caller abandons the call midway, in which case
/// it is labeled `request_error`.
pub struct MeteredCoreClient {
	inner: Arc<dyn CoreClient>,
	metrics: TxSubMetrics,
}

impl MeteredCoreClient {
	pub fn new(inner: Arc<dyn CoreClient>, metrics: TxSubMetrics) -> Self {
		Self { inner, metrics }
	}
}

#[async_trait]
impl CoreClient for MeteredCoreClient {
	async fn submit_transaction(
		&self,
		ctx: &CallContext,
		envelope: &str,
	) -> Result<TxResponse, CoreClientError> {
		// Undecodable envelopes still go to core; they count as zero operations.
		let operation_count = match rpc_xdr::decode_envelope(envelope) {
			Ok(decoded) => rpc_xdr::operation_count(&decoded),
			Err(e) => {
				tracing::debug!(error = %e, "Could not count operations of submitted envelope");
				0
			},
		};

		let started = Instant::now();
		let mut label = scopeguard::guard(
			SubmissionOutcome::RequestError.label().to_string(),
			|label| {
				self.metrics
					.observe(&label, started.elapsed(), operation_count);
			},
		);

		let result = self.inner.submit_transaction(ctx, envelope).await;
		if let Ok(response) = &result {
			*label = response.outcome_label().to_string();
		}
		result
	}

	async fn info(&self, ctx: &CallContext) -> Result<CoreInfo, CoreClientError> {
		self.inner.info(ctx).await
	}
}
