//! Core client module for the RPC service.
//!
//! This module abstracts the connection to the core validator process behind
//! the [`CoreClient`] trait. The HTTP implementation talks to core's command
//! interface; the metered implementation wraps any other client and records
//! submission metrics without altering its results.

use async_trait::async_trait;
use rpc_types::{CoreInfo, TxResponse};
use thiserror::Error;

pub use rpc_types::{CallContext, DeadlineExceeded};

mod metered;

pub use metered::MeteredCoreClient;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while talking to core.
#[derive(Debug, Error)]
pub enum CoreClientError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Core answered with a non-success HTTP status.
	#[error("Unexpected HTTP status {status}: {body}")]
	Http { status: u16, body: String },
	/// Core's reply could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The caller's deadline expired before core answered.
	#[error("Deadline exceeded")]
	DeadlineExceeded,
}

impl From<DeadlineExceeded> for CoreClientError {
	fn from(_: DeadlineExceeded) -> Self {
		CoreClientError::DeadlineExceeded
	}
}

/// Trait defining the interface to the core validator process.
///
/// Any type implementing it can stand in for core, including decorators and
/// test doubles.
#[async_trait]
pub trait CoreClient: Send + Sync {
	/// Submits a base64 XDR transaction envelope to core.
	///
	/// Returns core's reply verbatim. Errors only when no reply was obtained.
	async fn submit_transaction(
		&self,
		ctx: &CallContext,
		envelope: &str,
	) -> Result<TxResponse, CoreClientError>;

	/// Retrieves core's build and state information.
	async fn info(&self, ctx: &CallContext) -> Result<CoreInfo, CoreClientError>;
}
