//! In-memory ledger used by unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use solana_commitment_config::CommitmentLevel;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::ledger::{BlockhashWindow, LedgerClient, LedgerError, SignatureStatus};

/// Call counters per ledger method.
#[derive(Debug, Default, Clone, Copy)]
struct Calls {
    decimals: u64,
    accounts: u64,
    statuses: u64,
    heights: u64,
    blockhashes: u64,
}

/// Scriptable ledger: fixed accounts, scripted statuses, recorded broadcasts.
#[derive(Debug)]
pub(crate) struct MockLedger {
    /// Decimals reported for every mint.
    token_decimals: u8,
    /// Makes `get_token_decimals` fail.
    token_supply_fails: bool,
    /// Existing accounts.
    accounts: HashMap<Pubkey, Vec<u8>>,
    /// Current block height reported by `get_block_height`.
    block_height: u64,
    /// Height added after each `get_block_height` call.
    block_height_step: u64,
    /// `last_valid_block_height` of every blockhash window handed out.
    last_valid_block_height: u64,
    /// Statuses returned by successive polls.
    scripted_statuses: Mutex<VecDeque<Option<SignatureStatus>>>,
    /// Status returned once the script is exhausted.
    fallback_status: Option<SignatureStatus>,
    /// Makes `send_transaction` fail.
    send_fails: bool,
    /// Height cursor advanced by `block_height_step`.
    height_cursor: Mutex<u64>,
    /// Call counters.
    calls: Mutex<Calls>,
    /// Decoded broadcast transactions, in order.
    broadcasts: Mutex<Vec<VersionedTransaction>>,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self {
            token_decimals: 0,
            token_supply_fails: false,
            accounts: HashMap::new(),
            block_height: 0,
            block_height_step: 0,
            last_valid_block_height: 1_000,
            scripted_statuses: Mutex::new(VecDeque::new()),
            fallback_status: None,
            send_fails: false,
            height_cursor: Mutex::new(0),
            calls: Mutex::new(Calls::default()),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_token_decimals(mut self, decimals: u8) -> Self {
        self.token_decimals = decimals;
        self
    }

    pub(crate) fn failing_token_supply(mut self) -> Self {
        self.token_supply_fails = true;
        self
    }

    pub(crate) fn with_account(mut self, address: Pubkey, data: Vec<u8>) -> Self {
        let _ = self.accounts.insert(address, data);
        self
    }

    pub(crate) fn with_block_height(mut self, height: u64, step: u64) -> Self {
        self.block_height = height;
        self.block_height_step = step;
        self
    }

    pub(crate) fn with_last_valid_block_height(mut self, height: u64) -> Self {
        self.last_valid_block_height = height;
        self
    }

    pub(crate) fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Option<SignatureStatus>>,
    ) -> Self {
        if let Ok(mut scripted) = self.scripted_statuses.lock() {
            scripted.extend(statuses);
        }
        self
    }

    pub(crate) fn with_fallback_status(mut self, status: Option<SignatureStatus>) -> Self {
        self.fallback_status = status;
        self
    }

    pub(crate) fn failing_send(mut self) -> Self {
        self.send_fails = true;
        self
    }

    fn calls(&self) -> Calls {
        self.calls.lock().map(|calls| *calls).unwrap_or_default()
    }

    fn record(&self, bump: impl FnOnce(&mut Calls)) -> u64 {
        if let Ok(mut calls) = self.calls.lock() {
            bump(&mut calls);
            return calls.blockhashes;
        }
        0
    }

    pub(crate) fn decimals_calls(&self) -> u64 {
        self.calls().decimals
    }

    pub(crate) fn account_calls(&self) -> u64 {
        self.calls().accounts
    }

    pub(crate) fn status_calls(&self) -> u64 {
        self.calls().statuses
    }

    pub(crate) fn height_calls(&self) -> u64 {
        self.calls().heights
    }

    pub(crate) fn blockhash_calls(&self) -> u64 {
        self.calls().blockhashes
    }

    pub(crate) fn broadcasts(&self) -> Vec<VersionedTransaction> {
        self.broadcasts
            .lock()
            .map(|broadcasts| broadcasts.clone())
            .unwrap_or_default()
    }
}

/// Status at `level` with no execution error.
pub(crate) fn status_at(level: Option<CommitmentLevel>) -> SignatureStatus {
    SignatureStatus {
        slot: 1,
        confirmation_status: level,
        err: None,
    }
}

fn mock_failure(method: &'static str) -> LedgerError {
    LedgerError::RpcMethod {
        method,
        code: -32_000,
        message: "mock failure".to_owned(),
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_block_height(&self, _commitment: CommitmentLevel) -> Result<u64, LedgerError> {
        let _ = self.record(|calls| calls.heights = calls.heights.saturating_add(1));
        let mut cursor = self
            .height_cursor
            .lock()
            .map_err(|_poisoned| mock_failure("getBlockHeight"))?;
        let height = self.block_height.saturating_add(*cursor);
        *cursor = cursor.saturating_add(self.block_height_step);
        Ok(height)
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let _ = self.record(|calls| calls.statuses = calls.statuses.saturating_add(1));
        let scripted = self
            .scripted_statuses
            .lock()
            .map_err(|_poisoned| mock_failure("getSignatureStatuses"))?
            .pop_front();
        Ok(scripted.unwrap_or_else(|| self.fallback_status.clone()))
    }

    async fn get_token_decimals(&self, _mint: &Pubkey) -> Result<u8, LedgerError> {
        let _ = self.record(|calls| calls.decimals = calls.decimals.saturating_add(1));
        if self.token_supply_fails {
            return Err(mock_failure("getTokenSupply"));
        }
        Ok(self.token_decimals)
    }

    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let _ = self.record(|calls| calls.accounts = calls.accounts.saturating_add(1));
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_latest_blockhash(
        &self,
        _commitment: CommitmentLevel,
    ) -> Result<BlockhashWindow, LedgerError> {
        let call = self.record(|calls| calls.blockhashes = calls.blockhashes.saturating_add(1));
        let seed = u8::try_from(call % 255).unwrap_or_default().saturating_add(1);
        Ok(BlockhashWindow {
            blockhash: Hash::new_from_array([seed; 32]),
            last_valid_block_height: self.last_valid_block_height,
        })
    }

    async fn send_transaction(&self, tx_bytes: &[u8]) -> Result<Signature, LedgerError> {
        if self.send_fails {
            return Err(mock_failure("sendTransaction"));
        }
        let tx: VersionedTransaction =
            bincode::deserialize(tx_bytes).map_err(|_error| LedgerError::MalformedValue {
                method: "sendTransaction",
                field: "transaction",
                value: format!("{} bytes", tx_bytes.len()),
            })?;
        let signature = tx.signatures.first().copied().unwrap_or_default();
        if let Ok(mut broadcasts) = self.broadcasts.lock() {
            broadcasts.push(tx);
        }
        Ok(signature)
    }
}
