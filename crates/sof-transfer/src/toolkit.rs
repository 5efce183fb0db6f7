//! Ledger-bound transfer context acting on behalf of one identity.

use std::sync::Arc;

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::{
    assets::{AssetResolver, LedgerAssetResolver},
    instructions::{
        AssetTransfer, InstructionError, TokenQuantity, TokenTransferAccounts, nft_instructions,
        sol_instruction, token_transfer_instructions,
    },
    ledger::LedgerClient,
};

/// Builds transfers sent by a fixed identity against one ledger.
///
/// Fungible amounts here are raw base units; use
/// [`spl_instructions`](crate::instructions::spl_instructions) for human-scale amounts.
#[derive(Clone)]
pub struct AssetToolkit {
    /// Ledger used for account and decimals queries.
    ledger: Arc<dyn LedgerClient>,
    /// Resolver used for asset lookups.
    resolver: Arc<dyn AssetResolver>,
    /// Sender, authority, and fee payer of every transfer.
    identity: Pubkey,
}

impl AssetToolkit {
    /// Creates a toolkit resolving assets straight from `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, identity: Pubkey) -> Self {
        Self {
            resolver: Arc::new(LedgerAssetResolver::new(ledger.clone())),
            ledger,
            identity,
        }
    }

    /// Replaces the asset resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the acting identity.
    #[must_use]
    pub const fn identity(&self) -> Pubkey {
        self.identity
    }

    /// Native SOL transfer from the identity.
    #[must_use]
    pub fn sol_instructions(&self, to: &Pubkey, amount_sol: f64) -> Vec<Instruction> {
        vec![sol_instruction(&self.identity, to, amount_sol)]
    }

    /// Fungible transfer of `base_units` raw units of `mint` from the identity.
    ///
    /// # Errors
    ///
    /// Returns [`InstructionError`] when the destination lookup fails or the token program
    /// rejects the instruction arguments.
    pub async fn spl_instructions(
        &self,
        to: &Pubkey,
        base_units: u64,
        mint: &Pubkey,
    ) -> Result<Vec<Instruction>, InstructionError> {
        token_transfer_instructions(
            self.ledger.as_ref(),
            TokenTransferAccounts {
                funder: self.identity,
                from_owner: self.identity,
                to_owner: *to,
                mint: *mint,
            },
            TokenQuantity::BaseUnits(base_units),
        )
        .await
    }

    /// Asset transfer of `mint` from the identity.
    ///
    /// # Errors
    ///
    /// Returns [`InstructionError::Asset`] when the asset cannot be resolved.
    pub async fn nft_instructions(
        &self,
        to: &Pubkey,
        mint: &Pubkey,
        amount: Option<u64>,
    ) -> Result<Vec<Instruction>, InstructionError> {
        let mut transfer = AssetTransfer::new(self.identity, *to);
        if let Some(amount) = amount {
            transfer = transfer.with_amount(amount);
        }
        nft_instructions(self.resolver.as_ref(), mint, transfer).await
    }
}
