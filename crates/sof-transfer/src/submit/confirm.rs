//! Confirmation polling and blockhash-expiry detection.

use solana_commitment_config::CommitmentLevel;
use solana_signature::Signature;

use super::SubmitError;
use crate::{
    config::{StatusRule, SubmitConfig},
    ledger::{LedgerClient, SignatureStatus},
};

/// Explorer base used in confirmation logs.
const EXPLORER_TX_URL: &str = "https://solscan.io/tx";

/// Returns true when `status` counts as confirmed under `rule`.
#[must_use]
pub fn status_is_confirmed(rule: StatusRule, status: &SignatureStatus) -> bool {
    match rule {
        StatusRule::AnyStatus => true,
        StatusRule::ConfirmedOrFinalized => matches!(
            status.confirmation_status,
            Some(CommitmentLevel::Confirmed | CommitmentLevel::Finalized)
        ),
    }
}

/// Returns true once the block height has passed `last_valid_block_height - margin`.
///
/// # Errors
///
/// Returns [`SubmitError::BlockHeight`] when the height query fails.
pub async fn is_blockhash_expired(
    ledger: &dyn LedgerClient,
    config: &SubmitConfig,
    last_valid_block_height: u64,
) -> Result<bool, SubmitError> {
    let current = ledger
        .get_block_height(config.commitment)
        .await
        .map_err(|source| SubmitError::BlockHeight { source })?;
    Ok(current > last_valid_block_height.saturating_sub(config.expiry_margin_blocks))
}

/// Polls `signature` until it is confirmed (`true`) or its blockhash window expires (`false`).
///
/// Without `max_polls_per_attempt` this keeps polling for as long as the node neither
/// reports the signature nor advances past the window.
///
/// # Errors
///
/// Returns [`SubmitError`] when a status or block-height query fails.
pub async fn confirm_signature_status(
    ledger: &dyn LedgerClient,
    config: &SubmitConfig,
    signature: &Signature,
    last_valid_block_height: u64,
) -> Result<bool, SubmitError> {
    let mut polls = 0_u32;
    loop {
        let status = ledger
            .get_signature_status(signature)
            .await
            .map_err(|source| SubmitError::SignatureStatus { source })?;
        polls = polls.saturating_add(1);

        if let Some(status) = status
            && status_is_confirmed(config.status_rule, &status)
        {
            tracing::info!(
                signature = %signature,
                slot = status.slot,
                explorer = %format!("{EXPLORER_TX_URL}/{signature}"),
                "transaction confirmed"
            );
            return Ok(true);
        }

        if is_blockhash_expired(ledger, config, last_valid_block_height).await? {
            tracing::warn!(
                signature = %signature,
                last_valid_block_height,
                "blockhash has expired"
            );
            return Ok(false);
        }

        if config
            .max_polls_per_attempt
            .is_some_and(|max_polls| polls >= max_polls)
        {
            tracing::warn!(signature = %signature, polls, "confirmation poll limit reached");
            return Ok(false);
        }

        tracing::debug!(signature = %signature, polls, "transaction not confirmed yet");
        tokio::time::sleep(config.poll_interval).await;
    }
}
