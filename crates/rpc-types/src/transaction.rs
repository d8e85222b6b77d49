//! Transaction identifier types.

use serde::{Serialize, Serializer};
use std::fmt;

/// Canonical 32-byte hash of a transaction on a given network.
///
/// Rendered as 64 lowercase hex characters, both in logs and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransactionHash(pub [u8; 32]);

impl TransactionHash {
	/// Returns the hex encoding used by clients to look the transaction up.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl From<[u8; 32]> for TransactionHash {
	fn from(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}
}

impl Serialize for TransactionHash {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_hex())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_renders_lowercase_hex() {
		let mut bytes = [0u8; 32];
		bytes[0] = 0xAB;
		bytes[31] = 0x01;
		let hash = TransactionHash(bytes);

		let rendered = hash.to_string();
		assert_eq!(rendered.len(), 64);
		assert!(rendered.starts_with("ab"));
		assert!(rendered.ends_with("01"));
		assert_eq!(
			serde_json::to_value(hash).unwrap(),
			serde_json::Value::String(rendered)
		);
	}
}
