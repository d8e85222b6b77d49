//! Types describing replies from the core validator process.
//!
//! Core answers a submission with a small JSON document whose `status` field
//! comes from a fixed vocabulary. Anything outside that vocabulary is treated
//! as a protocol violation by the callers, so parsing never coerces unknown
//! values into a known status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when core reports a status outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

/// Submission status reported verbatim by core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
	/// Accepted into core's pending queue.
	Pending,
	/// Already known to core.
	Duplicate,
	/// Core is overloaded and asks the client to resubmit later.
	TryAgainLater,
	/// Rejected; the reply carries an error result and diagnostics.
	Error,
}

impl TxStatus {
	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			TxStatus::Pending => "PENDING",
			TxStatus::Duplicate => "DUPLICATE",
			TxStatus::TryAgainLater => "TRY_AGAIN_LATER",
			TxStatus::Error => "ERROR",
		}
	}
}

impl fmt::Display for TxStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TxStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"PENDING" => Ok(TxStatus::Pending),
			"DUPLICATE" => Ok(TxStatus::Duplicate),
			"TRY_AGAIN_LATER" => Ok(TxStatus::TryAgainLater),
			"ERROR" => Ok(TxStatus::Error),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

/// Outcome of a single submission attempt, as seen by observers.
///
/// The four core statuses are joined by two locally synthesized outcomes:
/// `Exception` when core flags an internal exception, and `RequestError`
/// when the request never produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
	Pending,
	Duplicate,
	TryAgainLater,
	Error,
	Exception,
	RequestError,
}

impl SubmissionOutcome {
	/// Returns the label under which the outcome is reported in metrics.
	pub fn label(&self) -> &'static str {
		match self {
			SubmissionOutcome::Pending => TxStatus::Pending.as_str(),
			SubmissionOutcome::Duplicate => TxStatus::Duplicate.as_str(),
			SubmissionOutcome::TryAgainLater => TxStatus::TryAgainLater.as_str(),
			SubmissionOutcome::Error => TxStatus::Error.as_str(),
			SubmissionOutcome::Exception => "exception",
			SubmissionOutcome::RequestError => "request_error",
		}
	}
}

impl From<TxStatus> for SubmissionOutcome {
	fn from(status: TxStatus) -> Self {
		match status {
			TxStatus::Pending => SubmissionOutcome::Pending,
			TxStatus::Duplicate => SubmissionOutcome::Duplicate,
			TxStatus::TryAgainLater => SubmissionOutcome::TryAgainLater,
			TxStatus::Error => SubmissionOutcome::Error,
		}
	}
}

/// Reply from core's transaction submission endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
	/// Non-empty when core hit an internal exception handling the request.
	#[serde(default)]
	pub exception: String,
	/// Base64 XDR `TransactionResult`, present for `ERROR` replies.
	#[serde(default)]
	pub error: String,
	/// Raw status string.
	#[serde(default)]
	pub status: String,
	/// Base64 XDR array of diagnostic events, present for `ERROR` replies.
	#[serde(default)]
	pub diagnostic_events: String,
}

impl TxResponse {
	/// Returns true when core reported an internal exception.
	pub fn is_exception(&self) -> bool {
		!self.exception.is_empty()
	}

	/// Returns the metrics label for this reply.
	///
	/// Unknown statuses are reported verbatim rather than folded into a
	/// known label.
	pub fn outcome_label(&self) -> &str {
		if self.is_exception() {
			return SubmissionOutcome::Exception.label();
		}
		&self.status
	}
}

/// Reply from core's `/info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreInfo {
	pub info: CoreInfoDetails,
}

/// Build and state details reported by core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreInfoDetails {
	/// Core's self-reported build string.
	#[serde(default)]
	pub build: String,
	/// Highest protocol version the core build supports.
	#[serde(default)]
	pub protocol_version: u32,
	/// Human readable synchronization state.
	#[serde(default)]
	pub state: String,
	/// Network passphrase core is connected to.
	#[serde(default)]
	pub network: Option<String>,
	/// Latest ledger core has closed.
	#[serde(default)]
	pub ledger: CoreLedgerInfo,
}

/// Ledger summary embedded in core's info reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreLedgerInfo {
	#[serde(default)]
	pub num: u32,
	#[serde(default)]
	pub hash: String,
	#[serde(default, rename = "closeTime")]
	pub close_time: i64,
	#[serde(default)]
	pub version: u32,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_parsing_rejects_unknown_values() {
		assert_eq!("PENDING".parse::<TxStatus>().unwrap(), TxStatus::Pending);
		assert_eq!(
			"TRY_AGAIN_LATER".parse::<TxStatus>().unwrap(),
			TxStatus::TryAgainLater
		);
		assert_eq!(
			"pending".parse::<TxStatus>().unwrap_err(),
			UnknownStatus("pending".to_string())
		);
		assert!("".parse::<TxStatus>().is_err());
	}

	#[test]
	fn test_status_serde_matches_as_str() {
		for status in [
			TxStatus::Pending,
			TxStatus::Duplicate,
			TxStatus::TryAgainLater,
			TxStatus::Error,
		] {
			let json = serde_json::to_value(status).unwrap();
			assert_eq!(json, serde_json::Value::String(status.as_str().to_string()));
			assert_eq!(status.as_str().parse::<TxStatus>().unwrap(), status);
		}
	}

	#[test]
	fn test_outcome_labels() {
		assert_eq!(SubmissionOutcome::RequestError.label(), "request_error");
		assert_eq!(SubmissionOutcome::Exception.label(), "exception");
		assert_eq!(SubmissionOutcome::from(TxStatus::Error).label(), "ERROR");
	}

	#[test]
	fn test_outcome_label_prefers_exception() {
		let response = TxResponse {
			exception: "boom".to_string(),
			status: "PENDING".to_string(),
			..Default::default()
		};
		assert!(response.is_exception());
		assert_eq!(response.outcome_label(), "exception");

		let unknown = TxResponse {
			status: "FROZEN".to_string(),
			..Default::default()
		};
		assert_eq!(unknown.outcome_label(), "FROZEN");
	}

	#[test]
	fn test_tx_response_tolerates_missing_fields() {
		let response: TxResponse = serde_json::from_str(r#"{"status":"PENDING"}"#).unwrap();
		assert_eq!(response.status, "PENDING");
		assert!(!response.is_exception());
		assert!(response.diagnostic_events.is_empty());
	}

	#[test]
	fn test_core_info_parses_nested_ledger() {
		let info: CoreInfo = serde_json::from_str(
			r#"{"info":{"build":"v21.0.0","protocol_version":21,"state":"Synced!",
			"ledger":{"num":42,"hash":"aa","closeTime":1700000000,"version":21}}}"#,
		)
		.unwrap();
		assert_eq!(info.info.build, "v21.0.0");
		assert_eq!(info.info.ledger.num, 42);
		assert_eq!(info.info.ledger.close_time, 1_700_000_000);
		assert!(info.info.network.is_none());
	}
}
