//! Retrying submitter: build, sign, broadcast, confirm.

use std::sync::Arc;

use solana_instruction::Instruction;
use solana_signature::Signature;

use super::{SubmitError, confirm};
use crate::{
    builder::{MessageFormat, TxBuilder},
    config::SubmitConfig,
    ledger::LedgerClient,
    signing::{KeypairSigner, TransactionSigner},
};

/// Submits instruction sets and retries with a fresh blockhash until confirmed.
///
/// Each retry rebuilds and re-signs the transaction against a newly fetched blockhash, so
/// every attempt carries a distinct signature. An attempt judged expired can still land
/// late; callers needing exactly-once effects must check for that themselves.
#[derive(Clone)]
pub struct TransferSubmitter {
    /// Ledger used for blockhash, broadcast, and confirmation queries.
    ledger: Arc<dyn LedgerClient>,
    /// Retry and polling tuning.
    config: SubmitConfig,
}

impl TransferSubmitter {
    /// Creates a submitter with default tuning.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            config: SubmitConfig::default(),
        }
    }

    /// Sets retry and polling tuning.
    #[must_use]
    pub fn with_config(mut self, config: SubmitConfig) -> Self {
        self.config = config.normalized();
        self
    }

    /// Returns the active tuning.
    #[must_use]
    pub const fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// Sends `instructions` as a legacy transaction signed by `signer`.
    ///
    /// Returns `Ok(true)` once confirmed and `Ok(false)` when every attempt expired.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when a ledger query, build, signing, or broadcast fails.
    pub async fn send_legacy<S>(
        &self,
        signer: &S,
        instructions: &[Instruction],
    ) -> Result<bool, SubmitError>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_with_retry(signer, instructions, MessageFormat::Legacy)
            .await
    }

    /// Sends `instructions` as a v0 transaction signed by `signer`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when a ledger query, build, signing, or broadcast fails.
    pub async fn send_v0<S>(
        &self,
        signer: &S,
        instructions: &[Instruction],
    ) -> Result<bool, SubmitError>
    where
        S: TransactionSigner + ?Sized,
    {
        self.send_with_retry(signer, instructions, MessageFormat::V0)
            .await
    }

    /// Sends `instructions` as a legacy transaction auto-signed by a held keypair.
    ///
    /// Backend only; see [`KeypairSigner`].
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when a ledger query, build, signing, or broadcast fails.
    pub async fn send_with_keypair(
        &self,
        signer: &KeypairSigner,
        instructions: &[Instruction],
    ) -> Result<bool, SubmitError> {
        self.send_with_retry(signer, instructions, MessageFormat::Legacy)
            .await
    }

    /// Polls `signature` against this submitter's ledger and tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when a status or block-height query fails.
    pub async fn confirm_signature_status(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<bool, SubmitError> {
        confirm::confirm_signature_status(
            self.ledger.as_ref(),
            &self.config,
            signature,
            last_valid_block_height,
        )
        .await
    }

    /// Returns true once the ledger has moved past the usable part of the window.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::BlockHeight`] when the height query fails.
    pub async fn is_blockhash_expired(
        &self,
        last_valid_block_height: u64,
    ) -> Result<bool, SubmitError> {
        confirm::is_blockhash_expired(self.ledger.as_ref(), &self.config, last_valid_block_height)
            .await
    }

    /// Runs up to `max_attempts` build/sign/broadcast/confirm cycles.
    async fn send_with_retry<S>(
        &self,
        signer: &S,
        instructions: &[Instruction],
        format: MessageFormat,
    ) -> Result<bool, SubmitError>
    where
        S: TransactionSigner + ?Sized,
    {
        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            if self.submit_attempt(signer, instructions, format).await? {
                return Ok(true);
            }
            if attempt < max_attempts {
                tracing::info!(attempt, max_attempts, "transaction not confirmed, retrying");
            }
        }
        tracing::warn!(max_attempts, "transaction failed after {max_attempts} tries");
        Ok(false)
    }

    /// One cycle against a freshly fetched blockhash window.
    async fn submit_attempt<S>(
        &self,
        signer: &S,
        instructions: &[Instruction],
        format: MessageFormat,
    ) -> Result<bool, SubmitError>
    where
        S: TransactionSigner + ?Sized,
    {
        let window = self
            .ledger
            .get_latest_blockhash(self.config.commitment)
            .await
            .map_err(|source| SubmitError::Blockhash { source })?;

        let mut builder = TxBuilder::new(signer.pubkey())
            .with_format(format)
            .add_instructions(instructions.iter().cloned());
        if let Some(units) = self.config.compute_unit_limit {
            builder = builder.with_compute_unit_limit(units);
        }
        if let Some(micro_lamports) = self.config.priority_fee_micro_lamports {
            builder = builder.with_priority_fee_micro_lamports(micro_lamports);
        }
        let unsigned = builder
            .build_unsigned(window.blockhash)
            .map_err(|source| SubmitError::Build { source })?;

        let tx = signer
            .sign_transaction(unsigned)
            .await
            .map_err(|source| SubmitError::Sign { source })?;
        let tx_bytes =
            bincode::serialize(&tx).map_err(|source| SubmitError::Encode { source })?;
        let signature = self
            .ledger
            .send_transaction(&tx_bytes)
            .await
            .map_err(|source| SubmitError::Broadcast { source })?;
        tracing::debug!(
            signature = %signature,
            last_valid_block_height = window.last_valid_block_height,
            "transaction broadcast"
        );

        self.confirm_signature_status(&signature, window.last_valid_block_height)
            .await
    }
}
