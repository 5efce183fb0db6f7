//! Signing boundary: held keypairs and externally approved wallets.

use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_message::VersionedMessage;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::{Signer, SignerError};
use solana_transaction::versioned::VersionedTransaction;
use thiserror::Error;

use crate::builder::UnsignedTx;

/// Signing-layer errors.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The wallet owner declined to sign.
    #[error("signature request refused: {reason}")]
    Refused {
        /// Reason reported by the wallet.
        reason: String,
    },
    /// Signer-level failure.
    #[error("signer failed: {source}")]
    Signer {
        /// Underlying signer error.
        source: SignerError,
    },
    /// The approved signature does not verify for the fee payer.
    #[error("wallet returned a signature that does not verify for {pubkey}")]
    InvalidSignature {
        /// Expected signer.
        pubkey: Pubkey,
    },
    /// The message needs more than the single fee-payer signature.
    #[error("message requires {required} signatures, approval signing supports exactly one")]
    UnsupportedSignerCount {
        /// Signatures demanded by the message header.
        required: u8,
    },
    /// Secret key material could not be decoded.
    #[error("invalid secret key: {message}")]
    InvalidSecretKey {
        /// Decode error description.
        message: String,
    },
}

/// Capability that turns an unsigned message into a signed transaction.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Fee payer and signing key.
    fn pubkey(&self) -> Pubkey;

    /// Signs `unsigned`, or refuses.
    async fn sign_transaction(
        &self,
        unsigned: UnsignedTx,
    ) -> Result<VersionedTransaction, SigningError>;
}

/// Decodes a base58-encoded 64-byte secret key.
///
/// # Errors
///
/// Returns [`SigningError::InvalidSecretKey`] when the input is not base58 or does not hold
/// a consistent ed25519 keypair.
pub fn keypair_from_base58(secret: &str) -> Result<Keypair, SigningError> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|error| SigningError::InvalidSecretKey {
            message: error.to_string(),
        })?;
    Keypair::try_from(bytes.as_slice()).map_err(|error| SigningError::InvalidSecretKey {
        message: error.to_string(),
    })
}

/// Signs immediately with a keypair held in process memory.
///
/// Backend use only: whoever constructs this signer holds the raw secret key, so it must
/// never run where key material has to stay hidden from the caller (browsers, shared
/// clients, end-user devices).
pub struct KeypairSigner {
    /// Held keypair.
    keypair: Keypair,
}

impl KeypairSigner {
    /// Wraps a keypair.
    #[must_use]
    pub const fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Decodes a base58 secret key into a signer.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidSecretKey`] when decoding fails.
    pub fn from_base58(secret: &str) -> Result<Self, SigningError> {
        keypair_from_base58(secret).map(Self::new)
    }

    /// Returns the held keypair.
    #[must_use]
    pub const fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        unsigned: UnsignedTx,
    ) -> Result<VersionedTransaction, SigningError> {
        VersionedTransaction::try_new(unsigned.into_message(), &[&self.keypair])
            .map_err(|source| SigningError::Signer { source })
    }
}

/// External wallet that asks its owner to approve each message.
#[async_trait]
pub trait WalletApproval: Send + Sync {
    /// Wallet public key.
    fn pubkey(&self) -> Pubkey;

    /// Presents `message` for approval and returns the owner's signature over its bytes.
    async fn approve(&self, message: &VersionedMessage) -> Result<Signature, SigningError>;
}

/// Signer delegating to a [`WalletApproval`] and verifying what comes back.
pub struct ApprovalSigner<W> {
    /// Approving wallet.
    wallet: W,
}

impl<W> ApprovalSigner<W> {
    /// Wraps an approving wallet.
    #[must_use]
    pub const fn new(wallet: W) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl<W: WalletApproval> TransactionSigner for ApprovalSigner<W> {
    fn pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    async fn sign_transaction(
        &self,
        unsigned: UnsignedTx,
    ) -> Result<VersionedTransaction, SigningError> {
        let message = unsigned.into_message();
        let required = message.header().num_required_signatures;
        if required != 1 {
            return Err(SigningError::UnsupportedSignerCount { required });
        }
        let signature = self.wallet.approve(&message).await?;
        let pubkey = self.wallet.pubkey();
        if !signature.verify(pubkey.as_ref(), &message.serialize()) {
            return Err(SigningError::InvalidSignature { pubkey });
        }
        Ok(VersionedTransaction {
            signatures: vec![signature],
            message,
        })
    }
}
