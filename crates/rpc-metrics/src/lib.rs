//! Metrics module for the RPC service.
//!
//! A single [`MetricsRegistry`] is built at startup and handed to every
//! component that records or exposes metrics. Nothing here installs a global
//! recorder. Submission summaries are recorded through a Prometheus recorder
//! computing quantiles over a rolling window; build info and process metrics
//! live in a separate `prometheus` registry, together with the log line
//! counters fed by [`LogMetricsLayer`]. Both render into one exposition.
//!
//! Process metrics stand in for the runtime collectors of garbage-collected
//! runtimes; a Rust binary has no further runtime state worth exporting.

mod logs;
mod txsub;

pub use logs::LogMetricsLayer;
pub use txsub::TxSubMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use rpc_config::{BuildInfo, MetricsConfig};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Quantiles reported by every summary.
pub const SUMMARY_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// Errors that can occur while setting up or rendering metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
	/// The summary recorder rejected its settings.
	#[error("Recorder error: {0}")]
	Recorder(String),
	/// Error raised by the prometheus registry.
	#[error("Registry error: {0}")]
	Registry(#[from] prometheus::Error),
	/// Rendered output was not valid UTF-8.
	#[error("Encoding error: {0}")]
	Encoding(#[from] std::string::FromUtf8Error),
}

impl From<metrics_exporter_prometheus::BuildError> for MetricsError {
	fn from(err: metrics_exporter_prometheus::BuildError) -> Self {
		MetricsError::Recorder(err.to_string())
	}
}

/// Process-wide metrics state.
pub struct MetricsRegistry {
	namespace: String,
	recorder: Arc<PrometheusRecorder>,
	handle: PrometheusHandle,
	registry: Registry,
	log_metrics: LogMetricsLayer,
}

impl MetricsRegistry {
	/// Builds the registry and registers build info, log line and process
	/// collectors.
	pub fn new(config: &MetricsConfig, build: &BuildInfo) -> Result<Self, MetricsError> {
		let buckets = NonZeroU32::new(config.window_buckets)
			.ok_or_else(|| MetricsError::Recorder("window_buckets must be non-zero".into()))?;
		let bucket_duration = Duration::from_secs(config.window_seconds) / buckets.get();

		let recorder = PrometheusBuilder::new()
			.set_quantiles(&SUMMARY_QUANTILES)?
			.set_bucket_duration(bucket_duration)?
			.set_bucket_count(buckets)
			.build_recorder();
		let handle = recorder.handle();

		let registry = Registry::new();
		let build_info = GaugeVec::new(
			Opts::new(
				"build_info",
				"A metric with a constant '1' value labeled by version, commit, branch, build timestamp and rust version",
			)
			.namespace(config.namespace.clone()),
			&["version", "commit", "branch", "build_timestamp", "rustversion"],
		)?;
		build_info
			.with_label_values(&[
				build.version.as_str(),
				build.commit_hash.as_str(),
				build.branch.as_str(),
				build.build_timestamp.as_str(),
				build.rustc_version.as_str(),
			])
			.set(1.0);
		registry.register(Box::new(build_info))?;

		let log_metrics = LogMetricsLayer::register(&config.namespace, &registry)?;

		#[cfg(target_os = "linux")]
		registry.register(Box::new(
			prometheus::process_collector::ProcessCollector::for_self(),
		))?;

		tracing::debug!(
			namespace = %config.namespace,
			window_seconds = config.window_seconds,
			"Metrics registry initialized"
		);

		Ok(Self {
			namespace: config.namespace.clone(),
			recorder: Arc::new(recorder),
			handle,
			registry,
			log_metrics,
		})
	}

	/// Prefix shared by every exported metric name.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Returns the submission metrics bound to this registry.
	pub fn tx_sub_metrics(&self) -> TxSubMetrics {
		TxSubMetrics::new(&self.namespace, Arc::clone(&self.recorder))
	}

	/// Returns the layer counting log lines into this registry.
	///
	/// Install it in the process subscriber; lines are counted only once it
	/// is installed.
	pub fn log_metrics_layer(&self) -> LogMetricsLayer {
		self.log_metrics.clone()
	}

	/// Folds pending observations into the rolling summaries.
	pub fn run_upkeep(&self) {
		self.handle.run_upkeep();
	}

	/// Renders every metric in the Prometheus text exposition format.
	pub fn render(&self) -> Result<String, MetricsError> {
		let mut output = self.handle.render();

		let mut buffer = Vec::new();
		TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
		output.push_str(&String::from_utf8(buffer)?);

		Ok(output)
	}
}
