//! Envelope and diagnostic event builders for tests.

use stellar_xdr::curr::{
	ContractEvent, ContractEventBody, ContractEventType, ContractEventV0, DiagnosticEvent, Limits,
	Memo, MuxedAccount, Operation, OperationBody, Preconditions, ScVal, SequenceNumber, TimeBounds,
	TimePoint, Transaction, TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256,
	VecM, WriteXdr,
};

/// Passphrase of the public test network.
pub const PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Builds `count` inflation operations.
pub fn operations(count: usize) -> VecM<Operation, 100> {
	vec![
		Operation {
			source_account: None,
			body: OperationBody::Inflation,
		};
		count
	]
	.try_into()
	.unwrap_or_default()
}

/// Builds an unsigned V1 envelope with `op_count` operations.
pub fn v1_envelope(op_count: usize) -> TransactionEnvelope {
	TransactionEnvelope::Tx(TransactionV1Envelope {
		tx: Transaction {
			source_account: MuxedAccount::Ed25519(Uint256([7; 32])),
			fee: 100,
			seq_num: SequenceNumber(42),
			cond: Preconditions::Time(TimeBounds {
				min_time: TimePoint(0),
				max_time: TimePoint(1_000),
			}),
			memo: Memo::None,
			operations: operations(op_count),
			ext: TransactionExt::V0,
		},
		signatures: VecM::default(),
	})
}

/// Encodes an envelope the way clients submit it.
pub fn encode_envelope(envelope: &TransactionEnvelope) -> String {
	envelope.to_xdr_base64(Limits::none()).unwrap_or_default()
}

/// Builds a diagnostic event carrying a single numeric datum.
pub fn diagnostic_event(datum: u32, in_successful_contract_call: bool) -> DiagnosticEvent {
	DiagnosticEvent {
		in_successful_contract_call,
		event: ContractEvent {
			ext: Default::default(),
			contract_id: None,
			type_: ContractEventType::Diagnostic,
			body: ContractEventBody::V0(ContractEventV0 {
				topics: VecM::default(),
				data: ScVal::U32(datum),
			}),
		},
	}
}

/// Encodes diagnostic events the way core attaches them to a reply.
pub fn encode_diagnostic_events(events: Vec<DiagnosticEvent>) -> String {
	VecM::<DiagnosticEvent>::try_from(events)
		.ok()
		.and_then(|events| events.to_xdr_base64(Limits::none()).ok())
		.unwrap_or_default()
}
