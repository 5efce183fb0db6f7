//! Sends SOL from a backend keypair and waits for confirmation.
//!
//! ```text
//! SOF_TRANSFER_RPC_URL=https://api.devnet.solana.com \
//! SOF_TRANSFER_SECRET_KEY=<base58 secret> \
//! cargo run -p sof-transfer --example send_sol -- <recipient> <amount_sol>
//! ```

use std::{str::FromStr, sync::Arc};

use sof_transfer::{
    JsonRpcLedger, KeypairSigner, SubmitConfig, TransactionSigner, TransferSubmitter,
    config::read_env_var, init_tracing, sol_instruction,
};
use solana_pubkey::Pubkey;

/// Variable holding the sender's base58 secret key.
const SECRET_KEY_ENV: &str = "SOF_TRANSFER_SECRET_KEY";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let recipient = Pubkey::from_str(&args.next().ok_or("missing recipient argument")?)?;
    let amount_sol: f64 = args.next().ok_or("missing amount argument")?.parse()?;

    let secret = read_env_var(SECRET_KEY_ENV).ok_or("SOF_TRANSFER_SECRET_KEY is not set")?;
    let signer = KeypairSigner::from_base58(&secret)?;
    let ledger = Arc::new(JsonRpcLedger::from_env()?);
    let submitter = TransferSubmitter::new(ledger).with_config(SubmitConfig::from_env());

    let instruction = sol_instruction(&signer.pubkey(), &recipient, amount_sol);
    let confirmed = submitter
        .send_with_keypair(&signer, &[instruction])
        .await?;
    tracing::info!(confirmed, %recipient, amount_sol, "transfer finished");
    Ok(())
}
