//! Metaplex asset records and the resolver capability used by non-fungible transfers.

use std::sync::Arc;

use async_trait::async_trait;
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    types::{ProgrammableConfig, TokenStandard},
};
use solana_pubkey::Pubkey;
use thiserror::Error;

use crate::ledger::{LedgerClient, LedgerError};

/// Asset-resolution errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The mint has no metadata account.
    #[error("no asset metadata found for mint {mint}")]
    NotFound {
        /// Mint that was looked up.
        mint: Pubkey,
    },
    /// The metadata account exists but could not be decoded.
    #[error("failed to decode asset metadata for mint {mint}: {source}")]
    Decode {
        /// Mint that was looked up.
        mint: Pubkey,
        /// Borsh decode error.
        source: std::io::Error,
    },
    /// Ledger lookup failed.
    #[error("asset lookup failed: {source}")]
    Ledger {
        /// Underlying ledger error.
        source: LedgerError,
    },
}

/// The subset of a Metaplex metadata record that transfers depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Asset mint.
    pub mint: Pubkey,
    /// Metadata account address.
    pub metadata: Pubkey,
    /// Token standard, absent on records created before standards existed.
    pub token_standard: Option<TokenStandard>,
    /// Authorization rule set configured on the asset, if any.
    pub rule_set: Option<Pubkey>,
    /// Master edition account seen on the ledger; only consulted without a token standard.
    pub edition_exists: bool,
}

impl AssetRecord {
    /// Extracts the transfer-relevant fields from a decoded metadata account.
    #[must_use]
    pub fn from_metadata(metadata_address: Pubkey, metadata: &Metadata) -> Self {
        let rule_set = match &metadata.programmable_config {
            Some(ProgrammableConfig::V1 { rule_set }) => *rule_set,
            None => None,
        };
        Self {
            mint: metadata.mint,
            metadata: metadata_address,
            token_standard: metadata.token_standard,
            rule_set,
            edition_exists: false,
        }
    }

    /// Numeric token-standard discriminant (`4` is programmable non-fungible).
    #[must_use]
    pub fn token_standard_code(&self) -> Option<u8> {
        self.token_standard.map(|standard| standard as u8)
    }

    /// True for programmable non-fungible assets, whose transfers carry authorization rules.
    #[must_use]
    pub fn is_programmable(&self) -> bool {
        self.token_standard == Some(TokenStandard::ProgrammableNonFungible)
    }

    /// True when the asset has an edition account (master or print).
    ///
    /// Records predating token standards fall back to [`Self::edition_exists`].
    #[must_use]
    pub fn has_edition(&self) -> bool {
        match self.token_standard {
            Some(
                TokenStandard::NonFungible
                | TokenStandard::NonFungibleEdition
                | TokenStandard::ProgrammableNonFungible
                | TokenStandard::ProgrammableNonFungibleEdition,
            ) => true,
            Some(_) => false,
            None => self.edition_exists,
        }
    }
}

/// Resolves a mint to its asset record.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Returns the asset record for `mint`.
    async fn find_by_mint(&self, mint: &Pubkey) -> Result<AssetRecord, AssetError>;
}

/// Resolver reading the metadata PDA straight from the ledger.
#[derive(Clone)]
pub struct LedgerAssetResolver {
    /// Ledger used for account reads.
    ledger: Arc<dyn LedgerClient>,
}

impl LedgerAssetResolver {
    /// Creates a resolver backed by `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Returns true when the master edition PDA of `mint` holds an account.
    async fn master_edition_exists(&self, mint: &Pubkey) -> Result<bool, AssetError> {
        let (edition_address, _bump) = MasterEdition::find_pda(mint);
        self.ledger
            .get_account_data(&edition_address)
            .await
            .map(|data| data.is_some())
            .map_err(|source| AssetError::Ledger { source })
    }
}

#[async_trait]
impl AssetResolver for LedgerAssetResolver {
    async fn find_by_mint(&self, mint: &Pubkey) -> Result<AssetRecord, AssetError> {
        let (metadata_address, _bump) = Metadata::find_pda(mint);
        let data = self
            .ledger
            .get_account_data(&metadata_address)
            .await
            .map_err(|source| AssetError::Ledger { source })?
            .ok_or(AssetError::NotFound { mint: *mint })?;
        let metadata = Metadata::from_bytes(&data)
            .map_err(|source| AssetError::Decode { mint: *mint, source })?;
        let mut record = AssetRecord::from_metadata(metadata_address, &metadata);
        if record.token_standard.is_none() {
            record.edition_exists = self.master_edition_exists(mint).await?;
        }
        Ok(record)
    }
}
