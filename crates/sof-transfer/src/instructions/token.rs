//! SPL fungible-token transfer instructions.

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use spl_associated_token_account_client::{
    address::get_associated_token_address, instruction::create_associated_token_account,
};

use super::{InstructionError, amount::to_base_units};
use crate::ledger::LedgerClient;

/// Quantity of a fungible token to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenQuantity {
    /// Human-scale amount, scaled by the mint's decimals.
    Ui(f64),
    /// Raw base units, sent as-is.
    BaseUnits(u64),
}

/// Accounts involved in one fungible-token transfer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TokenTransferAccounts {
    /// Pays rent when the destination account must be created.
    pub funder: Pubkey,
    /// Current token owner and transfer authority.
    pub from_owner: Pubkey,
    /// Recipient wallet.
    pub to_owner: Pubkey,
    /// Token mint.
    pub mint: Pubkey,
}

/// Builds the instructions moving `amount` (human scale) of `mint` from `from` to `to`.
///
/// The returned sequence is the associated-account creation for `to` when that account
/// does not exist yet, followed by the token transfer.
///
/// # Errors
///
/// Returns [`InstructionError`] when a ledger query fails or the token program rejects
/// the instruction arguments.
pub async fn spl_instructions(
    ledger: &dyn LedgerClient,
    from: &Pubkey,
    to: &Pubkey,
    amount: f64,
    mint: &Pubkey,
) -> Result<Vec<Instruction>, InstructionError> {
    token_transfer_instructions(
        ledger,
        TokenTransferAccounts {
            funder: *from,
            from_owner: *from,
            to_owner: *to,
            mint: *mint,
        },
        TokenQuantity::Ui(amount),
    )
    .await
}

/// Builds an optional destination-account creation followed by a token transfer.
///
/// # Errors
///
/// Returns [`InstructionError`] when a ledger query fails or the token program rejects
/// the instruction arguments.
pub async fn token_transfer_instructions(
    ledger: &dyn LedgerClient,
    accounts: TokenTransferAccounts,
    quantity: TokenQuantity,
) -> Result<Vec<Instruction>, InstructionError> {
    let source = get_associated_token_address(&accounts.from_owner, &accounts.mint);
    let destination = get_associated_token_address(&accounts.to_owner, &accounts.mint);
    let base_units = match quantity {
        TokenQuantity::Ui(amount) => {
            let decimals = ledger
                .get_token_decimals(&accounts.mint)
                .await
                .map_err(|source| InstructionError::Ledger { source })?;
            to_base_units(amount, decimals)
        }
        TokenQuantity::BaseUnits(units) => units,
    };
    let destination_exists = ledger
        .get_account_data(&destination)
        .await
        .map_err(|source| InstructionError::Ledger { source })?
        .is_some();

    let mut instructions = Vec::with_capacity(2);
    if !destination_exists {
        instructions.push(create_associated_token_account(
            &accounts.funder,
            &accounts.to_owner,
            &accounts.mint,
            &spl_token::ID,
        ));
    }
    instructions.push(
        spl_token::instruction::transfer(
            &spl_token::ID,
            &source,
            &destination,
            &accounts.from_owner,
            &[],
            base_units,
        )
        .map_err(|source| InstructionError::TokenProgram { source })?,
    );
    Ok(instructions)
}
