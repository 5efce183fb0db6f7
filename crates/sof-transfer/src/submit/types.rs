//! Submission errors.

use thiserror::Error;

use crate::{builder::BuilderError, ledger::LedgerError, signing::SigningError};

/// Submission-level errors.
///
/// A submission that runs out of attempts is not an error; it returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Latest blockhash could not be fetched.
    #[error("failed to fetch latest blockhash: {source}")]
    Blockhash {
        /// Ledger error.
        source: LedgerError,
    },
    /// Message could not be assembled.
    #[error("failed to build transaction: {source}")]
    Build {
        /// Builder-layer failure.
        source: BuilderError,
    },
    /// Signer refused or failed.
    #[error("failed to sign transaction: {source}")]
    Sign {
        /// Signing-layer failure.
        source: SigningError,
    },
    /// Signed transaction could not be serialized.
    #[error("failed to encode signed transaction: {source}")]
    Encode {
        /// Bincode error.
        source: Box<bincode::ErrorKind>,
    },
    /// Node rejected or did not receive the broadcast.
    #[error("failed to broadcast transaction: {source}")]
    Broadcast {
        /// Ledger error.
        source: LedgerError,
    },
    /// Signature status poll failed.
    #[error("failed to poll signature status: {source}")]
    SignatureStatus {
        /// Ledger error.
        source: LedgerError,
    },
    /// Block height poll failed.
    #[error("failed to poll block height: {source}")]
    BlockHeight {
        /// Ledger error.
        source: LedgerError,
    },
}
