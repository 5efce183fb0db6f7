//! Ledger query/broadcast capability consumed by builders and the submitter.

/// JSON-RPC ledger client implementation.
mod rpc;

use async_trait::async_trait;
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use thiserror::Error;

pub use rpc::JsonRpcLedger;

/// Recent blockhash together with the last block height it stays valid for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BlockhashWindow {
    /// Recent blockhash referenced by the transaction message.
    pub blockhash: Hash,
    /// Last block height at which a transaction using `blockhash` can land.
    pub last_valid_block_height: u64,
}

/// Status reported by the ledger for one broadcast signature.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStatus {
    /// Slot the transaction was processed in.
    pub slot: u64,
    /// Commitment reached so far, when the node reports one.
    pub confirmation_status: Option<CommitmentLevel>,
    /// Transaction error payload, `None` when execution succeeded.
    pub err: Option<serde_json::Value>,
}

/// Ledger-level errors surfaced by [`LedgerClient`] implementations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Invalid client configuration.
    #[error("ledger client configuration invalid: {message}")]
    Config {
        /// Human-readable description.
        message: String,
    },
    /// Request could not be sent or the connection failed.
    #[error("ledger request failed for method `{method}`: {source}")]
    Request {
        /// RPC method name.
        method: &'static str,
        /// Transport error.
        source: reqwest::Error,
    },
    /// Endpoint answered with a non-success HTTP status.
    #[error("ledger method `{method}` failed with status {status}: {source}")]
    HttpStatus {
        /// RPC method name.
        method: &'static str,
        /// HTTP status returned by the endpoint.
        status: reqwest::StatusCode,
        /// Status error.
        source: reqwest::Error,
    },
    /// Response body was not the expected JSON shape.
    #[error("ledger method `{method}` returned invalid json: {source}")]
    InvalidJson {
        /// RPC method name.
        method: &'static str,
        /// Decode error.
        source: reqwest::Error,
    },
    /// Endpoint returned a JSON-RPC error object.
    #[error("ledger method `{method}` error {code}: {message}")]
    RpcMethod {
        /// RPC method name.
        method: &'static str,
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },
    /// Response carried neither `result` nor `error`.
    #[error("ledger method `{method}` returned neither result nor error")]
    MissingResultOrError {
        /// RPC method name.
        method: &'static str,
    },
    /// A returned field could not be parsed into its SDK type.
    #[error("ledger method `{method}` returned malformed {field}: {value}")]
    MalformedValue {
        /// RPC method name.
        method: &'static str,
        /// Field that failed to parse.
        field: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Read/broadcast access to a Solana ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Returns the current block height at `commitment`.
    async fn get_block_height(&self, commitment: CommitmentLevel) -> Result<u64, LedgerError>;

    /// Returns the status of `signature`, `None` when the node has not seen it.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError>;

    /// Returns the decimal precision of a token mint.
    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, LedgerError>;

    /// Returns raw account data, `None` when the account does not exist.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Returns the latest blockhash and its validity window at `commitment`.
    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> Result<BlockhashWindow, LedgerError>;

    /// Broadcasts serialized transaction bytes and returns the signature the node reports.
    async fn send_transaction(&self, tx_bytes: &[u8]) -> Result<Signature, LedgerError>;
}
