//! Configuration module for the RPC service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files, resolves
//! `${VAR}` and `${VAR:-default}` environment references before parsing, and
//! validates the result so required values are present and sane.

mod version;

pub use version::{BuildInfo, BRANCH, BUILD_TIMESTAMP, COMMIT_HASH, RUSTC_VERSION, VERSION};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the RPC service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Network the service submits transactions to.
	pub network: NetworkConfig,
	/// Connection to the core validator process.
	pub core: CoreConfig,
	/// JSON-RPC listener.
	#[serde(default)]
	pub api: ApiConfig,
	/// Metrics listener and summary window.
	#[serde(default)]
	pub metrics: MetricsConfig,
	/// Ledger retention.
	#[serde(default)]
	pub ledger: LedgerConfig,
}

/// Network identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Passphrase whose hash is mixed into every transaction hash.
	pub passphrase: String,
}

/// Connection settings for core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoreConfig {
	/// Base URL of core's HTTP command interface.
	pub url: String,
	/// Timeout in seconds for a single request to core.
	#[serde(default = "default_core_timeout")]
	pub timeout_seconds: u64,
}

impl CoreConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_seconds)
	}
}

/// Configuration for the JSON-RPC server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Deadline in seconds for handling a single request.
	#[serde(default = "default_request_timeout")]
	pub request_timeout_seconds: u64,
	/// Maximum request body size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			request_timeout_seconds: default_request_timeout(),
			max_request_size: default_max_request_size(),
		}
	}
}

impl ApiConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_seconds)
	}
}

/// Configuration for the metrics endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
	/// Whether the metrics listener is started.
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// Host address to bind the metrics listener to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the metrics listener to.
	#[serde(default = "default_metrics_port")]
	pub port: u16,
	/// Prefix of every exported metric name.
	#[serde(default = "default_metrics_namespace")]
	pub namespace: String,
	/// Length in seconds of the sliding window summaries are computed over.
	#[serde(default = "default_window_seconds")]
	pub window_seconds: u64,
	/// Number of buckets the window is split into.
	#[serde(default = "default_window_buckets")]
	pub window_buckets: u32,
}

impl Default for MetricsConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			host: default_api_host(),
			port: default_metrics_port(),
			namespace: default_metrics_namespace(),
			window_seconds: default_window_seconds(),
			window_buckets: default_window_buckets(),
		}
	}
}

/// Configuration for ledger retention.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	/// Number of most recent ledgers kept available to handlers.
	#[serde(default = "default_retention_window")]
	pub retention_window: u32,
}

impl Default for LedgerConfig {
	fn default() -> Self {
		Self {
			retention_window: default_retention_window(),
		}
	}
}

fn default_core_timeout() -> u64 {
	10
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8000
}

fn default_request_timeout() -> u64 {
	30
}

/// Returns the default maximum request size in bytes.
///
/// Envelopes are small, so 512KB leaves ample headroom.
fn default_max_request_size() -> usize {
	512 * 1024
}

fn default_true() -> bool {
	true
}

fn default_metrics_port() -> u16 {
	6061
}

fn default_metrics_namespace() -> String {
	"soroban_rpc".to_string()
}

/// Returns the default summary window, 10 minutes.
fn default_window_seconds() -> u64 {
	600
}

fn default_window_buckets() -> u32 {
	10
}

/// Returns the default retention window, one day of 5 second ledgers.
fn default_retention_window() -> u32 {
	17_280
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.passphrase.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Network passphrase cannot be empty".into(),
			));
		}

		if !(self.core.url.starts_with("http://") || self.core.url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"Core url '{}' must start with http:// or https://",
				self.core.url
			)));
		}
		if self.core.timeout_seconds == 0 || self.core.timeout_seconds > 300 {
			return Err(ConfigError::Validation(
				"Core timeout_seconds must be between 1 and 300".into(),
			));
		}

		if self.api.request_timeout_seconds == 0 || self.api.request_timeout_seconds > 300 {
			return Err(ConfigError::Validation(
				"API request_timeout_seconds must be between 1 and 300".into(),
			));
		}
		if self.api.max_request_size == 0 {
			return Err(ConfigError::Validation(
				"API max_request_size must be greater than 0".into(),
			));
		}

		self.validate_metrics()?;

		if self.ledger.retention_window == 0 {
			return Err(ConfigError::Validation(
				"Ledger retention_window must be greater than 0".into(),
			));
		}

		Ok(())
	}

	fn validate_metrics(&self) -> Result<(), ConfigError> {
		let metrics = &self.metrics;

		let re = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$")
			.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;
		if !re.is_match(&metrics.namespace) {
			return Err(ConfigError::Validation(format!(
				"Metrics namespace '{}' is not a valid metric name prefix",
				metrics.namespace
			)));
		}
		if metrics.window_seconds == 0 || metrics.window_buckets == 0 {
			return Err(ConfigError::Validation(
				"Metrics window_seconds and window_buckets must be greater than 0".into(),
			));
		}
		if metrics.window_seconds < u64::from(metrics.window_buckets) {
			return Err(ConfigError::Validation(
				"Metrics window_seconds must be at least window_buckets".into(),
			));
		}
		if metrics.enabled && metrics.host == self.api.host && metrics.port == self.api.port {
			return Err(ConfigError::Validation(format!(
				"Metrics and API listeners cannot share {}:{}",
				metrics.host, metrics.port
			)));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
