//! Transaction submission summaries.

use metrics::{Key, Label, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::PrometheusRecorder;
use std::sync::Arc;
use std::time::Duration;

static METADATA: Metadata<'static> =
	Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Records submission duration and operation count, labeled by outcome.
///
/// Cheap to clone; clones share the underlying recorder. Observations are
/// aggregated with atomics, so any number of tasks may record concurrently.
#[derive(Clone)]
pub struct TxSubMetrics {
	recorder: Arc<PrometheusRecorder>,
	duration_name: SharedString,
	operation_count_name: SharedString,
}

impl TxSubMetrics {
	pub(crate) fn new(namespace: &str, recorder: Arc<PrometheusRecorder>) -> Self {
		let duration_name: SharedString =
			format!("{}_txsub_submission_duration_seconds", namespace).into();
		let operation_count_name: SharedString =
			format!("{}_txsub_operation_count", namespace).into();

		recorder.describe_histogram(
			duration_name.clone().into(),
			None,
			"submission durations to core, over the configured sliding window".into(),
		);
		recorder.describe_histogram(
			operation_count_name.clone().into(),
			None,
			"number of operations included in a transaction, over the configured sliding window".into(),
		);

		Self {
			recorder,
			duration_name,
			operation_count_name,
		}
	}

	/// Records one submission attempt under `status`.
	pub fn observe(&self, status: &str, duration: Duration, operation_count: usize) {
		let labels = vec![Label::new("status", status.to_string())];

		let duration_key = Key::from_parts(self.duration_name.clone(), labels.clone());
		self.recorder
			.register_histogram(&duration_key, &METADATA)
			.record(duration);

		let count_key = Key::from_parts(self.operation_count_name.clone(), labels);
		self.recorder
			.register_histogram(&count_key, &METADATA)
			.record(operation_count as f64);
	}
}

#[cfg(test)]
mod tests {
	use crate::MetricsRegistry;
	use rpc_config::{BuildInfo, MetricsConfig};
	use std::time::Duration;

	fn registry() -> MetricsRegistry {
		MetricsRegistry::new(&MetricsConfig::default(), &BuildInfo::current()).unwrap()
	}

	#[test]
	fn test_observation_is_rendered_as_summary() {
		let registry = registry();
		let metrics = registry.tx_sub_metrics();
		metrics.observe("PENDING", Duration::from_millis(250), 3);

		let output = registry.render().unwrap();
		assert!(output.contains("# TYPE soroban_rpc_txsub_submission_duration_seconds summary"));
		assert!(output
			.contains("soroban_rpc_txsub_submission_duration_seconds_count{status=\"PENDING\"} 1"));
		assert!(output.contains("soroban_rpc_txsub_operation_count_count{status=\"PENDING\"} 1"));
		assert!(output.contains("soroban_rpc_txsub_operation_count_sum{status=\"PENDING\"} 3"));
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds{status=\"PENDING\",quantile=\"0.99\"}"
		));
	}

	#[test]
	fn test_labels_are_kept_apart() {
		let registry = registry();
		let metrics = registry.tx_sub_metrics();
		metrics.observe("request_error", Duration::from_millis(1), 0);
		metrics.observe("exception", Duration::from_millis(1), 2);
		metrics.observe("exception", Duration::from_millis(1), 2);

		let output = registry.render().unwrap();
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds_count{status=\"request_error\"} 1"
		));
		assert!(output
			.contains("soroban_rpc_txsub_submission_duration_seconds_count{status=\"exception\"} 2"));
		assert!(output.contains("soroban_rpc_txsub_operation_count_sum{status=\"exception\"} 4"));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_observations_are_not_lost() {
		let registry = registry();

		let mut tasks = Vec::new();
		for _ in 0..8 {
			let metrics = registry.tx_sub_metrics();
			tasks.push(tokio::spawn(async move {
				for _ in 0..100 {
					metrics.observe("DUPLICATE", Duration::from_micros(10), 1);
				}
			}));
		}
		for task in tasks {
			task.await.unwrap();
		}

		let output = registry.render().unwrap();
		assert!(output.contains(
			"soroban_rpc_txsub_submission_duration_seconds_count{status=\"DUPLICATE\"} 800"
		));
		assert!(output.contains("soroban_rpc_txsub_operation_count_sum{status=\"DUPLICATE\"} 800"));
	}
}
