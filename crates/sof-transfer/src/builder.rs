//! Transaction message builder.

use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_hash::Hash;
use solana_instruction::Instruction;
use solana_message::{CompileError, Message, VersionedMessage, v0};
use solana_pubkey::Pubkey;
use thiserror::Error;

/// Builder-layer errors.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The v0 message could not be compiled.
    #[error("failed to compile v0 message: {source}")]
    CompileMessage {
        /// Compile error.
        source: CompileError,
    },
}

/// Wire format of the assembled message.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum MessageFormat {
    /// Legacy message.
    #[default]
    Legacy,
    /// Version 0 compiled message (no lookup tables).
    V0,
}

/// Unsigned transaction wrapper.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    /// Versioned message ready to sign.
    message: VersionedMessage,
}

impl UnsignedTx {
    /// Returns the message payload.
    #[must_use]
    pub const fn message(&self) -> &VersionedMessage {
        &self.message
    }

    /// Consumes the wrapper and returns the message.
    #[must_use]
    pub fn into_message(self) -> VersionedMessage {
        self.message
    }
}

/// Builder for legacy or v0 transaction messages.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    /// Fee payer and signer.
    payer: Pubkey,
    /// User-provided instructions.
    instructions: Vec<Instruction>,
    /// Output message format.
    format: MessageFormat,
    /// Optional compute unit limit.
    compute_unit_limit: Option<u32>,
    /// Optional priority fee (micro-lamports per compute unit).
    priority_fee_micro_lamports: Option<u64>,
}

impl TxBuilder {
    /// Creates a transaction builder for a fee payer.
    #[must_use]
    pub const fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            instructions: Vec::new(),
            format: MessageFormat::Legacy,
            compute_unit_limit: None,
            priority_fee_micro_lamports: None,
        }
    }

    /// Appends one instruction.
    #[must_use]
    pub fn add_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends many instructions.
    #[must_use]
    pub fn add_instructions<I>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
        self
    }

    /// Selects the message format.
    #[must_use]
    pub const fn with_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets compute unit limit.
    #[must_use]
    pub const fn with_compute_unit_limit(mut self, units: u32) -> Self {
        self.compute_unit_limit = Some(units);
        self
    }

    /// Sets priority fee in micro-lamports.
    #[must_use]
    pub const fn with_priority_fee_micro_lamports(mut self, micro_lamports: u64) -> Self {
        self.priority_fee_micro_lamports = Some(micro_lamports);
        self
    }

    /// Builds an unsigned transaction wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::CompileMessage`] when a v0 message cannot be compiled.
    pub fn build_unsigned(self, recent_blockhash: Hash) -> Result<UnsignedTx, BuilderError> {
        Ok(UnsignedTx {
            message: self.build_message(recent_blockhash)?,
        })
    }

    /// Builds the message in the selected format.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::CompileMessage`] when a v0 message cannot be compiled.
    pub fn build_message(self, recent_blockhash: Hash) -> Result<VersionedMessage, BuilderError> {
        let mut instructions = Vec::with_capacity(self.instructions.len().saturating_add(2));
        if let Some(units) = self.compute_unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(units));
        }
        if let Some(micro_lamports) = self.priority_fee_micro_lamports {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
                micro_lamports,
            ));
        }
        instructions.extend(self.instructions);
        match self.format {
            MessageFormat::Legacy => Ok(VersionedMessage::Legacy(Message::new_with_blockhash(
                &instructions,
                Some(&self.payer),
                &recent_blockhash,
            ))),
            MessageFormat::V0 => {
                v0::Message::try_compile(&self.payer, &instructions, &[], recent_blockhash)
                    .map(VersionedMessage::V0)
                    .map_err(|source| BuilderError::CompileMessage { source })
            }
        }
    }
}
