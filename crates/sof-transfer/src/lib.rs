#![forbid(unsafe_code)]

//! Transfer SDK for building, signing, submitting, and confirming Solana value transfers.
//!
//! Instruction builders cover native SOL, SPL fungible tokens, and Metaplex
//! non-fungible/programmable assets. [`TransferSubmitter`] signs through a
//! [`TransactionSigner`], broadcasts, and retries against a fresh blockhash until the
//! signature is confirmed or the attempt budget is spent.

/// Metaplex asset records and resolution.
pub mod assets;
/// Transaction/message builder helpers.
pub mod builder;
/// Submission tuning and environment overrides.
pub mod config;
/// Transfer instruction builders.
pub mod instructions;
/// Ledger query and broadcast capability.
pub mod ledger;
/// Tracing subscriber setup.
pub mod logging;
/// Signing boundary types.
pub mod signing;
/// Retrying submission and confirmation polling.
pub mod submit;
/// Identity-bound transfer context.
pub mod toolkit;

#[cfg(test)]
/// Shared in-memory test doubles.
mod test_support;

pub use assets::{AssetError, AssetRecord, AssetResolver, LedgerAssetResolver};
pub use builder::{BuilderError, MessageFormat, TxBuilder, UnsignedTx};
pub use config::{RpcLedgerConfig, StatusRule, SubmitConfig};
pub use instructions::{
    AssetTransfer, InstructionError, TransferAsset, TransferIntent, nft_instructions,
    sol_instruction, spl_instructions,
};
pub use ledger::{BlockhashWindow, JsonRpcLedger, LedgerClient, LedgerError, SignatureStatus};
pub use logging::init_tracing;
pub use signing::{
    ApprovalSigner, KeypairSigner, SigningError, TransactionSigner, WalletApproval,
    keypair_from_base58,
};
pub use submit::{SubmitError, TransferSubmitter};
pub use toolkit::AssetToolkit;
