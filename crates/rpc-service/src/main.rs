//! Main entry point for the transaction submission RPC service.
//!
//! This binary accepts JSON-RPC calls, forwards submitted transactions to
//! core and reports submission metrics on a separate listener.
//!
//! Ledger ingestion is not part of this binary. The ledger store it wires is
//! an empty [`MemoryLedgerStore`] that nothing records into, so
//! `sendTransaction` reports `latestLedger` 0 and `getVersionInfo` reports
//! `protocolVersion` 0 until an ingestion component calls
//! [`MemoryLedgerStore::record_ledger`] on it.

use clap::Parser;
use rpc_config::{BuildInfo, Config};
use rpc_core_client::implementations::http::HttpCoreClient;
use rpc_core_client::{CoreClient, MeteredCoreClient};
use rpc_ledger::implementations::memory::MemoryLedgerStore;
use rpc_methods::{GetVersionInfoHandler, SendTransactionHandler};
use rpc_metrics::MetricsRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod server;

/// Interval at which pending observations are folded into the summaries.
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Command-line arguments for the RPC service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the RPC service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Loads configuration from file and builds the metrics registry
/// 3. Initializes logging infrastructure, counting log lines into the registry
/// 4. Wires core client, ledger store and handlers
/// 5. Serves JSON-RPC and metrics until one listener fails or the process is interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	let build = BuildInfo::current();
	let metrics = Arc::new(MetricsRegistry::new(&config.metrics, &build)?);

	use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(fmt::layer().with_thread_ids(true).with_target(true))
		.with(metrics.log_metrics_layer())
		.init();

	tracing::info!("Started soroban-rpc");
	tracing::info!(
		core = %config.core.url,
		passphrase = %config.network.passphrase,
		"Loaded configuration"
	);

	let state = build_state(&config, build, &metrics)?;

	let upkeep_registry = Arc::clone(&metrics);
	tokio::spawn(async move {
		let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
		loop {
			interval.tick().await;
			upkeep_registry.run_upkeep();
		}
	});

	let api_task = server::start_api_server(&config.api, state);
	let metrics_task = async {
		if config.metrics.enabled {
			server::start_metrics_server(&config.metrics, Arc::clone(&metrics)).await
		} else {
			tracing::info!("Metrics listener disabled");
			std::future::pending().await
		}
	};

	tokio::select! {
		result = api_task => {
			tracing::info!("JSON-RPC server finished");
			result?;
		}
		result = metrics_task => {
			tracing::info!("Metrics server finished");
			result?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received interrupt");
		}
	}

	tracing::info!("Stopped soroban-rpc");
	Ok(())
}

/// Builds the handlers and their collaborators from configuration.
///
/// The ledger store starts empty and is not fed by this binary.
fn build_state(
	config: &Config,
	build: BuildInfo,
	metrics: &MetricsRegistry,
) -> Result<server::AppState, Box<dyn std::error::Error>> {
	let http_core = HttpCoreClient::new(&config.core.url, config.core.timeout())?;
	let core: Arc<dyn CoreClient> = Arc::new(MeteredCoreClient::new(
		Arc::new(http_core),
		metrics.tx_sub_metrics(),
	));

	// Empty until an ingestion component records into it; see the module docs.
	let ledgers = Arc::new(MemoryLedgerStore::new(config.ledger.retention_window));

	Ok(server::AppState {
		send_transaction: Arc::new(SendTransactionHandler::new(
			Arc::clone(&core),
			ledgers.clone(),
			config.network.passphrase.clone(),
		)),
		get_version_info: Arc::new(GetVersionInfoHandler::new(
			core,
			ledgers.clone(),
			ledgers,
			build,
		)),
		request_timeout: config.api.request_timeout(),
	})
}
