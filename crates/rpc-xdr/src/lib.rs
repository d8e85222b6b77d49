//! XDR handling for transaction submission.
//!
//! This module decodes client supplied transaction envelopes, computes their
//! network-specific hashes and decodes the diagnostic events core attaches to
//! rejected transactions. All decoding is bounded so untrusted input cannot
//! exhaust the stack or memory.

use stellar_xdr::curr::Limits;
use thiserror::Error;

mod diagnostics;
mod envelope;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

pub use diagnostics::decode_diagnostic_events;
pub use envelope::{decode_envelope, hash_transaction, network_id, operation_count};
pub use stellar_xdr::curr::{DiagnosticEvent, TransactionEnvelope};

/// Maximum nesting depth accepted when decoding XDR.
pub const MAX_DECODE_DEPTH: u32 = 500;

/// Errors that can occur while handling XDR payloads.
#[derive(Debug, Error)]
pub enum XdrError {
	/// The transaction envelope could not be decoded.
	#[error("Invalid envelope: {0}")]
	InvalidEnvelope(String),
	/// The envelope decoded but could not be hashed.
	#[error("Invalid hash: {0}")]
	InvalidHash(String),
	/// Diagnostic events returned by core could not be decoded.
	#[error("Invalid diagnostic events: {0}")]
	Diagnostics(String),
}

/// Limits applied to a base64 payload of the given encoded length.
///
/// The decoded stream can never be longer than its base64 encoding, so the
/// encoded length bounds every allocation.
pub(crate) fn decode_limits(encoded: &str) -> Limits {
	Limits {
		depth: MAX_DECODE_DEPTH,
		len: encoded.len(),
	}
}
