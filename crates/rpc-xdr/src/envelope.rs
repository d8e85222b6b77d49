//! Envelope decoding and hashing.

use crate::{decode_limits, XdrError};
use rpc_types::TransactionHash;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{FeeBumpTransactionInnerTx, ReadXdr, TransactionEnvelope};

/// Decodes a base64 XDR transaction envelope.
///
/// Rejects malformed base64, truncated XDR and trailing bytes.
pub fn decode_envelope(encoded: &str) -> Result<TransactionEnvelope, XdrError> {
	TransactionEnvelope::from_xdr_base64(encoded, decode_limits(encoded))
		.map_err(|e| XdrError::InvalidEnvelope(e.to_string()))
}

/// Derives the network identifier mixed into every transaction hash.
pub fn network_id(passphrase: &str) -> [u8; 32] {
	Sha256::digest(passphrase.as_bytes()).into()
}

/// Computes the hash clients use to look up a transaction.
///
/// V0 envelopes are hashed as their V1 equivalent, and fee bumps hash the
/// outer fee bump transaction.
pub fn hash_transaction(
	envelope: &TransactionEnvelope,
	passphrase: &str,
) -> Result<TransactionHash, XdrError> {
	envelope
		.hash(network_id(passphrase))
		.map(TransactionHash)
		.map_err(|e| XdrError::InvalidHash(e.to_string()))
}

/// Number of operations in the transaction.
///
/// For fee bumps this is the inner transaction's operation count.
pub fn operation_count(envelope: &TransactionEnvelope) -> usize {
	match envelope {
		TransactionEnvelope::TxV0(e) => e.tx.operations.len(),
		TransactionEnvelope::Tx(e) => e.tx.operations.len(),
		TransactionEnvelope::TxFeeBump(e) => match &e.tx.inner_tx {
			FeeBumpTransactionInnerTx::Tx(inner) => inner.tx.operations.len(),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::{encode_envelope as encode, operations, v1_envelope, PASSPHRASE};
	use base64::Engine;
	use stellar_xdr::curr::{
		DecoratedSignature, FeeBumpTransaction, FeeBumpTransactionEnvelope, FeeBumpTransactionExt,
		Limits, Memo, MuxedAccount, SequenceNumber, TimeBounds, TimePoint, TransactionV0,
		TransactionV0Envelope, TransactionV0Ext, Uint256, VecM, WriteXdr,
	};

	#[test]
	fn test_decode_is_pure() {
		let encoded = encode(&v1_envelope(2));
		let first = decode_envelope(&encoded).unwrap();
		let second = decode_envelope(&encoded).unwrap();
		assert_eq!(first, second);
		assert_eq!(first, v1_envelope(2));
	}

	#[test]
	fn test_decode_rejects_malformed_base64() {
		assert!(matches!(
			decode_envelope("not base64 !!"),
			Err(XdrError::InvalidEnvelope(_))
		));
		assert!(matches!(decode_envelope(""), Err(XdrError::InvalidEnvelope(_))));
	}

	#[test]
	fn test_decode_rejects_truncated_and_trailing_bytes() {
		let bytes = v1_envelope(1).to_xdr(Limits::none()).unwrap();
		let engine = base64::engine::general_purpose::STANDARD;

		let truncated = engine.encode(&bytes[..bytes.len() - 4]);
		assert!(matches!(
			decode_envelope(&truncated),
			Err(XdrError::InvalidEnvelope(_))
		));

		let mut padded = bytes.clone();
		padded.extend_from_slice(&[0, 0, 0, 0]);
		assert!(matches!(
			decode_envelope(&engine.encode(&padded)),
			Err(XdrError::InvalidEnvelope(_))
		));
	}

	#[test]
	fn test_hash_is_deterministic_and_network_specific() {
		let envelope = v1_envelope(1);
		let first = hash_transaction(&envelope, PASSPHRASE).unwrap();
		let second = hash_transaction(&envelope, PASSPHRASE).unwrap();
		assert_eq!(first, second);

		let other = hash_transaction(&envelope, "Public Global Stellar Network ; September 2015")
			.unwrap();
		assert_ne!(first, other);
	}

	#[test]
	fn test_hash_ignores_signatures() {
		let unsigned = v1_envelope(1);
		let mut signed = unsigned.clone();
		if let TransactionEnvelope::Tx(ref mut e) = signed {
			e.signatures = vec![DecoratedSignature::default()].try_into().unwrap();
		}
		assert_eq!(
			hash_transaction(&unsigned, PASSPHRASE).unwrap(),
			hash_transaction(&signed, PASSPHRASE).unwrap()
		);
	}

	#[test]
	fn test_v0_hashes_as_v1_equivalent() {
		let time_bounds = TimeBounds {
			min_time: TimePoint(0),
			max_time: TimePoint(1_000),
		};
		let v0 = TransactionEnvelope::TxV0(TransactionV0Envelope {
			tx: TransactionV0 {
				source_account_ed25519: Uint256([7; 32]),
				fee: 100,
				seq_num: SequenceNumber(42),
				time_bounds: Some(time_bounds),
				memo: Memo::None,
				operations: operations(1),
				ext: TransactionV0Ext::V0,
			},
			signatures: VecM::default(),
		});

		assert_eq!(
			hash_transaction(&v0, PASSPHRASE).unwrap(),
			hash_transaction(&v1_envelope(1), PASSPHRASE).unwrap()
		);
	}

	#[test]
	fn test_fee_bump_hash_and_operation_count() {
		let TransactionEnvelope::Tx(inner) = v1_envelope(3) else {
			unreachable!()
		};
		let fee_bump = TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope {
			tx: FeeBumpTransaction {
				fee_source: MuxedAccount::Ed25519(Uint256([9; 32])),
				fee: 1_000,
				inner_tx: FeeBumpTransactionInnerTx::Tx(inner),
				ext: FeeBumpTransactionExt::V0,
			},
			signatures: VecM::default(),
		});

		assert_eq!(operation_count(&fee_bump), 3);
		assert_ne!(
			hash_transaction(&fee_bump, PASSPHRASE).unwrap(),
			hash_transaction(&v1_envelope(3), PASSPHRASE).unwrap()
		);
	}

	#[test]
	fn test_operation_count() {
		assert_eq!(operation_count(&v1_envelope(0)), 0);
		assert_eq!(operation_count(&v1_envelope(5)), 5);
	}

	#[test]
	fn test_network_id_is_sha256_of_passphrase() {
		let id = network_id(PASSPHRASE);
		assert_eq!(
			hex_string(&id),
			"cee0302d59844d32bdca915c8203dd44b33fbb7edc19051ea37abedf28ecd472"
		);
	}

	fn hex_string(bytes: &[u8]) -> String {
		bytes.iter().map(|b| format!("{:02x}", b)).collect()
	}
}
