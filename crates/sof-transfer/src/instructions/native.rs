//! Native SOL transfer instruction.

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use solana_system_interface::instruction as system_instruction;

use super::amount::sol_to_lamports;

/// Builds one system transfer moving `round(amount_sol * 10^9)` lamports from `from` to `to`.
#[must_use]
pub fn sol_instruction(from: &Pubkey, to: &Pubkey, amount_sol: f64) -> Instruction {
    system_instruction::transfer(from, to, sol_to_lamports(amount_sol))
}
