//! API types for the JSON-RPC surface.
//!
//! This module defines the request and response types of the
//! `sendTransaction` and `getVersionInfo` methods, the JSON-RPC 2.0 envelope
//! they travel in, and the closed error vocabulary returned to clients.

use crate::{TransactionHash, TxStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON-RPC error code for malformed request bodies.
pub const PARSE_ERROR: i64 = -32700;
/// JSON-RPC error code for structurally invalid requests.
pub const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC error code for unknown methods.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC error code for parameter errors caused by the caller.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC error code for failures on the server side.
pub const INTERNAL_ERROR: i64 = -32603;

/// Stable messages carried by `sendTransaction` errors.
pub mod messages {
	pub const INVALID_XDR: &str = "invalid_xdr";
	pub const INVALID_HASH: &str = "invalid_hash";
	pub const SUBMIT_FAILED: &str = "could not submit transaction to core";
	pub const CORE_EXCEPTION: &str = "received exception from core";
	pub const DIAGNOSTICS_UNDECODABLE: &str = "could not decode diagnostic events";
	pub const INVALID_STATUS: &str = "invalid status from core";
}

/// Error object returned to JSON-RPC clients.
///
/// Handlers translate every collaborator failure into one of these before
/// it crosses the service boundary. The message never carries internal
/// detail for server-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
	pub code: i64,
	pub message: String,
}

impl RpcError {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	/// Caller supplied unusable parameters.
	pub fn invalid_params(message: impl Into<String>) -> Self {
		Self::new(INVALID_PARAMS, message)
	}

	/// Something failed on our side or in core.
	pub fn internal(message: impl Into<String>) -> Self {
		Self::new(INTERNAL_ERROR, message)
	}

	pub fn parse_error(message: impl Into<String>) -> Self {
		Self::new(PARSE_ERROR, message)
	}

	pub fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(INVALID_REQUEST, message)
	}

	pub fn method_not_found(method: &str) -> Self {
		Self::new(METHOD_NOT_FOUND, format!("method not found: {}", method))
	}

	/// Returns true for errors attributable to the caller.
	pub fn is_client_error(&self) -> bool {
		matches!(
			self.code,
			PARSE_ERROR | INVALID_REQUEST | METHOD_NOT_FOUND | INVALID_PARAMS
		)
	}
}

/// Parameters of a JSON-RPC call, by name or by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
	Array(Vec<serde_json::Value>),
	Object(serde_json::Map<String, serde_json::Value>),
	#[default]
	None,
}

/// Incoming JSON-RPC 2.0 call.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
	pub jsonrpc: String,
	pub method: String,
	#[serde(default)]
	pub params: Params,
	#[serde(default)]
	pub id: serde_json::Value,
}

/// Outgoing JSON-RPC 2.0 reply carrying either a result or an error.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
	pub jsonrpc: &'static str,
	pub id: serde_json::Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<RpcError>,
}

impl JsonRpcResponse {
	pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
		Self {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		}
	}

	pub fn failure(id: serde_json::Value, error: RpcError) -> Self {
		Self {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(error),
		}
	}
}

/// Request for submitting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionRequest {
	/// Base64 XDR transaction envelope.
	pub transaction: String,
}

/// Response to a transaction submission accepted for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendTransactionResponse {
	/// Base64 XDR `TransactionResult`, only present when status is `ERROR`.
	#[serde(rename = "errorResultXdr", skip_serializing_if = "Option::is_none")]
	pub error_result_xdr: Option<String>,
	/// Base64 XDR diagnostic events, only present when status is `ERROR`.
	#[serde(
		rename = "diagnosticEventsXdr",
		skip_serializing_if = "Option::is_none"
	)]
	pub diagnostic_events_xdr: Option<Vec<String>>,
	/// Status reported by core.
	pub status: TxStatus,
	/// Hash of the submitted transaction.
	pub hash: TransactionHash,
	/// Latest ledger known when the request was handled.
	#[serde(rename = "latestLedger")]
	pub latest_ledger: u32,
	/// Close time of that ledger.
	#[serde(rename = "latestLedgerCloseTime", with = "i64_string")]
	pub latest_ledger_close_time: i64,
}

/// Response of the version info method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVersionInfoResponse {
	pub version: String,
	pub commit_hash: String,
	pub build_time_stamp: String,
	pub captive_core_version: String,
	pub protocol_version: u32,
}

/// Serde module for i64 values carried as JSON strings.
pub mod i64_string {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse::<i64>().map_err(serde::de::Error::custom)
	}
}
