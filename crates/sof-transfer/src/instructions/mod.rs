//! Transfer instruction builders.

/// Human-scale to base-unit conversion.
pub mod amount;
/// Metaplex asset transfers.
pub mod asset;
/// Native SOL transfers.
pub mod native;
/// SPL fungible-token transfers.
pub mod token;

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use spl_token::solana_program::program_error::ProgramError;
use thiserror::Error;

pub use amount::{LAMPORTS_PER_SOL, sol_to_lamports, to_base_units};
pub use asset::{
    AssetTransfer, DEFAULT_AUTHORIZATION_RULES, TOKEN_AUTH_RULES_PROGRAM_ID,
    asset_transfer_instruction, nft_instructions,
};
pub use native::sol_instruction;
pub use token::{TokenQuantity, TokenTransferAccounts, spl_instructions, token_transfer_instructions};

use crate::{
    assets::{AssetError, AssetResolver},
    ledger::{LedgerClient, LedgerError},
};

/// Instruction-building errors.
#[derive(Debug, Error)]
pub enum InstructionError {
    /// A read-only ledger query failed.
    #[error("ledger query failed: {source}")]
    Ledger {
        /// Underlying ledger error.
        source: LedgerError,
    },
    /// The token program rejected the instruction arguments.
    #[error("token instruction rejected: {source}")]
    TokenProgram {
        /// Program-level error.
        source: ProgramError,
    },
    /// The asset could not be resolved.
    #[error("asset resolution failed: {source}")]
    Asset {
        /// Asset-level error.
        source: AssetError,
    },
    /// A non-fungible amount was negative, fractional, or not finite.
    #[error("non-fungible amount must be a whole number of units, got {amount}")]
    FractionalUnits {
        /// Rejected amount.
        amount: f64,
    },
}

/// What is being moved.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransferAsset {
    /// Native SOL.
    Native,
    /// SPL fungible token.
    Fungible {
        /// Token mint.
        mint: Pubkey,
    },
    /// Metaplex non-fungible or programmable asset.
    NonFungible {
        /// Asset mint.
        mint: Pubkey,
    },
}

/// One desired movement of value, consumed into instructions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferIntent {
    /// Sender and signing authority.
    pub sender: Pubkey,
    /// Recipient wallet.
    pub recipient: Pubkey,
    /// Asset being moved.
    pub asset: TransferAsset,
    /// Human-scale quantity.
    ///
    /// Non-fungible assets take a whole number of units, `0.0` meaning the default of one;
    /// anything else is rejected with [`InstructionError::FractionalUnits`].
    pub amount: f64,
}

impl TransferIntent {
    /// Builds the instructions realizing this intent.
    ///
    /// # Errors
    ///
    /// Returns [`InstructionError`] when a ledger query, asset lookup, or token-program
    /// encoding fails.
    pub async fn into_instructions(
        self,
        ledger: &dyn LedgerClient,
        resolver: &dyn AssetResolver,
    ) -> Result<Vec<Instruction>, InstructionError> {
        match self.asset {
            TransferAsset::Native => Ok(vec![sol_instruction(
                &self.sender,
                &self.recipient,
                self.amount,
            )]),
            TransferAsset::Fungible { mint } => {
                spl_instructions(ledger, &self.sender, &self.recipient, self.amount, &mint).await
            }
            TransferAsset::NonFungible { mint } => {
                if !self.amount.is_finite() || self.amount < 0.0 || self.amount.fract() != 0.0 {
                    return Err(InstructionError::FractionalUnits {
                        amount: self.amount,
                    });
                }
                let mut transfer = AssetTransfer::new(self.sender, self.recipient);
                let units = to_base_units(self.amount, 0);
                if units > 0 {
                    transfer = transfer.with_amount(units);
                }
                nft_instructions(resolver, &mint, transfer).await
            }
        }
    }
}
