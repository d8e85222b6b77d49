//! JSON-RPC method handlers.
//!
//! Each handler owns its collaborators behind trait objects and translates
//! every collaborator failure into the closed [`rpc_types::RpcError`]
//! vocabulary before returning.

mod get_version_info;
mod send_transaction;

pub use get_version_info::GetVersionInfoHandler;
pub use send_transaction::SendTransactionHandler;
