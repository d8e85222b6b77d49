//! Diagnostic event decoding.

use crate::{decode_limits, XdrError};
use stellar_xdr::curr::{DiagnosticEvent, Limits, ReadXdr, VecM, WriteXdr};

/// Splits core's encoded diagnostic event array into one base64 string per event.
///
/// An empty input means core attached no events and decodes to an empty list.
/// Event order is preserved.
pub fn decode_diagnostic_events(encoded: &str) -> Result<Vec<String>, XdrError> {
	if encoded.is_empty() {
		return Ok(Vec::new());
	}

	let events = VecM::<DiagnosticEvent>::from_xdr_base64(encoded, decode_limits(encoded))
		.map_err(|e| XdrError::Diagnostics(e.to_string()))?;

	events
		.iter()
		.map(|event| {
			event
				.to_xdr_base64(Limits::none())
				.map_err(|e| XdrError::Diagnostics(e.to_string()))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::{diagnostic_event, encode_diagnostic_events};

	#[test]
	fn test_empty_input_yields_empty_list() {
		assert!(decode_diagnostic_events("").unwrap().is_empty());
	}

	#[test]
	fn test_encoded_empty_array_yields_empty_list() {
		let encoded = encode_diagnostic_events(vec![]);
		assert!(!encoded.is_empty());
		assert!(decode_diagnostic_events(&encoded).unwrap().is_empty());
	}

	#[test]
	fn test_events_are_split_in_order() {
		let events = vec![
			diagnostic_event(1, false),
			diagnostic_event(2, true),
			diagnostic_event(3, false),
		];
		let decoded = decode_diagnostic_events(&encode_diagnostic_events(events.clone())).unwrap();

		assert_eq!(decoded.len(), 3);
		for (encoded, expected) in decoded.iter().zip(events.iter()) {
			let event = DiagnosticEvent::from_xdr_base64(encoded, Limits::none()).unwrap();
			assert_eq!(&event, expected);
		}
	}

	#[test]
	fn test_corrupt_input_is_rejected() {
		assert!(matches!(
			decode_diagnostic_events("AAAA!!"),
			Err(XdrError::Diagnostics(_))
		));
		// Array length of one with no element following.
		assert!(matches!(
			decode_diagnostic_events("AAAAAQ=="),
			Err(XdrError::Diagnostics(_))
		));
	}
}
