//! Retrying transaction submission and confirmation polling.

/// Submitter with the bounded retry loop.
mod client;
/// Confirmation polling and blockhash-expiry detection.
pub mod confirm;
/// Submission errors.
mod types;

pub use client::TransferSubmitter;
pub use confirm::{confirm_signature_status, is_blockhash_expired, status_is_confirmed};
pub use types::SubmitError;
