//! Metaplex non-fungible and programmable asset transfer instructions.

use mpl_token_metadata::{
    accounts::{MasterEdition, TokenRecord},
    instructions::TransferV1Builder,
};
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use spl_associated_token_account_client::address::get_associated_token_address;

use super::InstructionError;
use crate::assets::{AssetRecord, AssetResolver};

/// Rule set used for programmable transfers when neither caller nor asset names one.
pub const DEFAULT_AUTHORIZATION_RULES: Pubkey =
    Pubkey::from_str_const("eBJLFYPxJmMGKuFwpDWkzxZeUrad92kZRC5BJLpzyT9");

/// Metaplex token-auth-rules program.
pub const TOKEN_AUTH_RULES_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("auth9SigNpDKz4sJJ1DfCTuZrZNSAgh9sFD3rboVmgg");

/// Parties and options of one asset transfer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AssetTransfer {
    /// Fee payer, also funds the destination token account when missing.
    pub payer: Pubkey,
    /// Current owner signing the transfer.
    pub authority: Pubkey,
    /// Recipient wallet.
    pub recipient: Pubkey,
    /// Units to move for non-programmable assets; defaults to one.
    pub amount: Option<u64>,
    /// Rule set forced for programmable assets.
    pub rule_set_override: Option<Pubkey>,
}

impl AssetTransfer {
    /// Transfer of one unit from `authority` (also payer) to `recipient`.
    #[must_use]
    pub const fn new(authority: Pubkey, recipient: Pubkey) -> Self {
        Self {
            payer: authority,
            authority,
            recipient,
            amount: None,
            rule_set_override: None,
        }
    }

    /// Sets the unit count for non-programmable assets.
    #[must_use]
    pub const fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Forces the authorization rule set used for programmable assets.
    #[must_use]
    pub const fn with_rule_set(mut self, rule_set: Pubkey) -> Self {
        self.rule_set_override = Some(rule_set);
        self
    }

    /// Sets a fee payer distinct from the authority.
    #[must_use]
    pub const fn with_payer(mut self, payer: Pubkey) -> Self {
        self.payer = payer;
        self
    }

    /// Rule set for a programmable transfer of `asset`.
    #[must_use]
    pub fn rule_set_for(&self, asset: &AssetRecord) -> Pubkey {
        self.rule_set_override
            .or(asset.rule_set)
            .unwrap_or(DEFAULT_AUTHORIZATION_RULES)
    }
}

/// Resolves `mint` and builds its transfer instructions.
///
/// # Errors
///
/// Returns [`InstructionError::Asset`] when the mint has no metadata or it cannot be decoded.
pub async fn nft_instructions(
    resolver: &dyn AssetResolver,
    mint: &Pubkey,
    transfer: AssetTransfer,
) -> Result<Vec<Instruction>, InstructionError> {
    let asset = resolver
        .find_by_mint(mint)
        .await
        .map_err(|source| InstructionError::Asset { source })?;
    Ok(vec![asset_transfer_instruction(&asset, &transfer)])
}

/// Builds a `TransferV1` for a resolved asset.
///
/// Programmable assets always move exactly one unit and carry token records plus an
/// authorization rule set; every other standard moves `transfer.amount` (default one).
#[must_use]
pub fn asset_transfer_instruction(asset: &AssetRecord, transfer: &AssetTransfer) -> Instruction {
    let token = get_associated_token_address(&transfer.authority, &asset.mint);
    let destination_token = get_associated_token_address(&transfer.recipient, &asset.mint);
    let edition = asset
        .has_edition()
        .then(|| MasterEdition::find_pda(&asset.mint).0);

    let mut builder = TransferV1Builder::new();
    builder
        .token(token)
        .token_owner(transfer.authority)
        .destination_token(destination_token)
        .destination_owner(transfer.recipient)
        .mint(asset.mint)
        .metadata(asset.metadata)
        .edition(edition)
        .authority(transfer.authority)
        .payer(transfer.payer);

    if asset.is_programmable() {
        builder
            .token_record(Some(TokenRecord::find_pda(&asset.mint, &token).0))
            .destination_token_record(Some(
                TokenRecord::find_pda(&asset.mint, &destination_token).0,
            ))
            .authorization_rules_program(Some(TOKEN_AUTH_RULES_PROGRAM_ID))
            .authorization_rules(Some(transfer.rule_set_for(asset)))
            .amount(1);
    } else {
        builder.amount(transfer.amount.unwrap_or(1));
    }
    builder.instruction()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mpl_token_metadata::types::TokenStandard;

    use super::*;
    use crate::{assets::LedgerAssetResolver, test_support::MockLedger};

    fn asset(token_standard: Option<TokenStandard>, rule_set: Option<Pubkey>) -> AssetRecord {
        AssetRecord {
            mint: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
            token_standard,
            rule_set,
            edition_exists: false,
        }
    }

    /// Decodes the `TransferV1` amount (two discriminator bytes, then u64 little-endian).
    fn transfer_amount(instruction: &Instruction) -> Option<u64> {
        let bytes: [u8; 8] = instruction.data.get(2..10)?.try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }

    fn references(instruction: &Instruction, key: &Pubkey) -> bool {
        instruction.accounts.iter().any(|meta| meta.pubkey == *key)
    }

    #[test]
    fn programmable_asset_carries_default_rule_set() {
        let record = asset(Some(TokenStandard::ProgrammableNonFungible), None);
        let transfer = AssetTransfer::new(Pubkey::new_unique(), Pubkey::new_unique());
        let instruction = asset_transfer_instruction(&record, &transfer);

        assert_eq!(instruction.program_id, mpl_token_metadata::ID);
        assert!(references(&instruction, &DEFAULT_AUTHORIZATION_RULES));
        assert!(references(&instruction, &TOKEN_AUTH_RULES_PROGRAM_ID));
    }

    #[test]
    fn programmable_asset_prefers_its_own_rule_set() {
        let own_rules = Pubkey::new_unique();
        let record = asset(Some(TokenStandard::ProgrammableNonFungible), Some(own_rules));
        let transfer = AssetTransfer::new(Pubkey::new_unique(), Pubkey::new_unique());
        let instruction = asset_transfer_instruction(&record, &transfer);

        assert!(references(&instruction, &own_rules));
        assert!(!references(&instruction, &DEFAULT_AUTHORIZATION_RULES));

        let forced = Pubkey::new_unique();
        let instruction =
            asset_transfer_instruction(&record, &transfer.with_rule_set(forced));
        assert!(references(&instruction, &forced));
        assert!(!references(&instruction, &own_rules));
    }

    #[test]
    fn other_standards_carry_no_authorization_rules() {
        for standard in [
            Some(TokenStandard::NonFungible),
            Some(TokenStandard::FungibleAsset),
            Some(TokenStandard::ProgrammableNonFungibleEdition),
            None,
        ] {
            let record = asset(standard, Some(Pubkey::new_unique()));
            let transfer = AssetTransfer::new(Pubkey::new_unique(), Pubkey::new_unique());
            let instruction = asset_transfer_instruction(&record, &transfer);

            assert!(!references(&instruction, &DEFAULT_AUTHORIZATION_RULES));
            assert!(!references(&instruction, &TOKEN_AUTH_RULES_PROGRAM_ID));
            if let Some(rule_set) = record.rule_set {
                assert!(!references(&instruction, &rule_set));
            }
        }
    }

    #[test]
    fn amount_override_applies_only_to_non_programmable_assets() {
        let owner = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let plain = asset(Some(TokenStandard::NonFungible), None);
        let programmable = asset(Some(TokenStandard::ProgrammableNonFungible), None);
        let three = AssetTransfer::new(owner, recipient).with_amount(3);

        assert_eq!(
            transfer_amount(&asset_transfer_instruction(&plain, &three)),
            Some(3)
        );
        assert_eq!(
            transfer_amount(&asset_transfer_instruction(&programmable, &three)),
            Some(1)
        );
        assert_eq!(
            transfer_amount(&asset_transfer_instruction(
                &plain,
                &AssetTransfer::new(owner, recipient)
            )),
            Some(1)
        );
    }

    #[test]
    fn legacy_asset_with_master_edition_passes_edition_account() {
        let record = AssetRecord {
            edition_exists: true,
            ..asset(None, None)
        };
        let edition = MasterEdition::find_pda(&record.mint).0;
        let transfer = AssetTransfer::new(Pubkey::new_unique(), Pubkey::new_unique());

        assert!(references(
            &asset_transfer_instruction(&record, &transfer),
            &edition
        ));
        assert!(!references(
            &asset_transfer_instruction(&asset(None, None), &transfer),
            &edition
        ));
    }

    #[test]
    fn transfer_routes_between_owner_token_accounts() {
        let record = asset(Some(TokenStandard::NonFungible), None);
        let owner = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let instruction =
            asset_transfer_instruction(&record, &AssetTransfer::new(owner, recipient));

        assert!(references(
            &instruction,
            &get_associated_token_address(&owner, &record.mint)
        ));
        assert!(references(
            &instruction,
            &get_associated_token_address(&recipient, &record.mint)
        ));
        assert!(references(&instruction, &MasterEdition::find_pda(&record.mint).0));
    }

    #[tokio::test]
    async fn unknown_mint_fails_with_asset_not_found() {
        let resolver = LedgerAssetResolver::new(Arc::new(MockLedger::new()));
        let transfer = AssetTransfer::new(Pubkey::new_unique(), Pubkey::new_unique());
        let result = nft_instructions(&resolver, &Pubkey::new_unique(), transfer).await;
        assert!(matches!(
            result,
            Err(InstructionError::Asset {
                source: crate::assets::AssetError::NotFound { .. }
            })
        ));
    }
}
