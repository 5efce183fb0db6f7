//! JSON-RPC ledger client implementation.

use std::str::FromStr;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;

use super::{BlockhashWindow, LedgerClient, LedgerError, SignatureStatus};
use crate::config::{RPC_URL_ENV, RpcLedgerConfig, read_env_var};

/// Ledger client speaking Solana JSON-RPC over HTTP.
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    /// HTTP client used for RPC calls.
    client: reqwest::Client,
    /// Target JSON-RPC endpoint URL.
    rpc_url: String,
    /// Broadcast tuning.
    config: RpcLedgerConfig,
}

impl JsonRpcLedger {
    /// Creates a JSON-RPC ledger client with default tuning.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] when HTTP client creation fails.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_config(rpc_url, RpcLedgerConfig::default())
    }

    /// Creates a JSON-RPC ledger client with explicit tuning.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] when HTTP client creation fails.
    pub fn with_config(
        rpc_url: impl Into<String>,
        config: RpcLedgerConfig,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| LedgerError::Config {
                message: error.to_string(),
            })?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            config,
        })
    }

    /// Creates a client from `SOF_TRANSFER_RPC_URL` and the other `SOF_TRANSFER_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] when the URL is unset or HTTP client creation fails.
    pub fn from_env() -> Result<Self, LedgerError> {
        let rpc_url = read_env_var(RPC_URL_ENV).ok_or_else(|| LedgerError::Config {
            message: format!("{RPC_URL_ENV} is not set"),
        })?;
        Self::with_config(rpc_url, RpcLedgerConfig::from_env())
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| LedgerError::Request { method, source })?;
        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|source| LedgerError::HttpStatus {
                method,
                status,
                source,
            })?;
        let parsed: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|source| LedgerError::InvalidJson { method, source })?;
        if let Some(result) = parsed.result {
            return Ok(result);
        }
        if let Some(error) = parsed.error {
            return Err(LedgerError::RpcMethod {
                method,
                code: error.code,
                message: error.message,
            });
        }
        Err(LedgerError::MissingResultOrError { method })
    }
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    /// Success payload.
    result: Option<T>,
    /// Error payload.
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// Error code reported by the node.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// `{ context, value }` wrapper used by most account/bank queries.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    /// Method payload; the slot context is ignored.
    value: T,
}

/// One entry of a `getSignatureStatuses` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSignatureStatus {
    /// Slot the transaction was processed in.
    slot: u64,
    /// Commitment reached, absent on older nodes.
    #[serde(default)]
    confirmation_status: Option<CommitmentLevel>,
    /// Execution error, `null` on success.
    #[serde(default)]
    err: Option<serde_json::Value>,
}

/// `getTokenSupply` value; only the mint decimals are read.
#[derive(Debug, Deserialize)]
struct RpcTokenAmount {
    /// Mint decimals.
    decimals: u8,
}

/// `getAccountInfo` value; only the data payload is read.
#[derive(Debug, Deserialize)]
struct RpcAccount {
    /// `[payload, encoding]` pair.
    data: (String, String),
}

/// `getLatestBlockhash` value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlockhash {
    /// Base58 blockhash.
    blockhash: String,
    /// Last block height the blockhash is valid for.
    last_valid_block_height: u64,
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn get_block_height(&self, commitment: CommitmentLevel) -> Result<u64, LedgerError> {
        self.call(
            "getBlockHeight",
            serde_json::json!([CommitmentConfig { commitment }]),
        )
        .await
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let statuses: WithContext<Vec<Option<RpcSignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                serde_json::json!([[signature.to_string()]]),
            )
            .await?;
        Ok(statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| SignatureStatus {
                slot: status.slot,
                confirmation_status: status.confirmation_status,
                err: status.err,
            }))
    }

    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, LedgerError> {
        let supply: WithContext<RpcTokenAmount> = self
            .call("getTokenSupply", serde_json::json!([mint.to_string()]))
            .await?;
        Ok(supply.value.decimals)
    }

    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        const METHOD: &str = "getAccountInfo";
        let account: WithContext<Option<RpcAccount>> = self
            .call(
                METHOD,
                serde_json::json!([address.to_string(), { "encoding": "base64" }]),
            )
            .await?;
        let Some(account) = account.value else {
            return Ok(None);
        };
        let (payload, _encoding) = account.data;
        BASE64_STANDARD
            .decode(payload.as_bytes())
            .map(Some)
            .map_err(|_error| LedgerError::MalformedValue {
                method: METHOD,
                field: "account data",
                value: payload,
            })
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> Result<BlockhashWindow, LedgerError> {
        const METHOD: &str = "getLatestBlockhash";
        let latest: WithContext<RpcBlockhash> = self
            .call(METHOD, serde_json::json!([CommitmentConfig { commitment }]))
            .await?;
        let blockhash = Hash::from_str(&latest.value.blockhash).map_err(|_error| {
            LedgerError::MalformedValue {
                method: METHOD,
                field: "blockhash",
                value: latest.value.blockhash.clone(),
            }
        })?;
        Ok(BlockhashWindow {
            blockhash,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    async fn send_transaction(&self, tx_bytes: &[u8]) -> Result<Signature, LedgerError> {
        const METHOD: &str = "sendTransaction";

        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SendConfig {
            /// Transaction payload encoding.
            encoding: &'static str,
            /// Skip preflight simulation.
            skip_preflight: bool,
            /// Preflight simulation commitment.
            #[serde(skip_serializing_if = "Option::is_none")]
            preflight_commitment: Option<CommitmentLevel>,
        }

        let encoded_tx = BASE64_STANDARD.encode(tx_bytes);
        let signature: String = self
            .call(
                METHOD,
                serde_json::json!([
                    encoded_tx,
                    SendConfig {
                        encoding: "base64",
                        skip_preflight: self.config.skip_preflight,
                        preflight_commitment: self.config.preflight_commitment,
                    }
                ]),
            )
            .await?;
        Signature::from_str(&signature).map_err(|_error| LedgerError::MalformedValue {
            method: METHOD,
            field: "signature",
            value: signature.clone(),
        })
    }
}
