//! Submission and ledger-client configuration, loadable from `SOF_TRANSFER_*` variables.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{LazyLock, RwLock},
    time::Duration,
};

use solana_commitment_config::CommitmentLevel;

/// Default number of broadcasts attempted per submission.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between two signature-status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_500);

/// Blocks subtracted from `last_valid_block_height` before a window counts as expired.
pub const DEFAULT_EXPIRY_MARGIN_BLOCKS: u64 = 150;

/// Default per-request timeout used by [`crate::ledger::JsonRpcLedger`].
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable naming the JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "SOF_TRANSFER_RPC_URL";

/// Values that shadow the process environment for `SOF_TRANSFER_*` lookups.
static ENV_OVERRIDES: LazyLock<RwLock<HashMap<String, String>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Looks `name` up in the override table, then in the process environment.
#[must_use]
pub fn read_env_var(name: &str) -> Option<String> {
    ENV_OVERRIDES
        .read()
        .ok()
        .and_then(|table| table.get(name).cloned())
        .or_else(|| std::env::var(name).ok())
}

/// Installs `overrides` as the whole override table, dropping earlier entries.
///
/// Lets embedders and tests configure the submitter without mutating the real
/// environment.
pub fn set_env_overrides(overrides: impl IntoIterator<Item = (String, String)>) {
    if let Ok(mut table) = ENV_OVERRIDES.write() {
        *table = overrides.into_iter().collect();
    }
}

/// Empties the override table so lookups fall through to the environment again.
pub fn clear_env_overrides() {
    if let Ok(mut table) = ENV_OVERRIDES.write() {
        table.clear();
    }
}

fn read_bool_env(name: &str, default: bool) -> bool {
    read_env_var(name)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(default)
}

fn read_parsed_env<T: FromStr>(name: &str) -> Option<T> {
    read_env_var(name).and_then(|value| value.trim().parse::<T>().ok())
}

/// Rule deciding when a reported signature status counts as confirmed.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum StatusRule {
    /// Any status the node reports counts, whatever its commitment or error.
    ///
    /// This is the historical behaviour of the helper; it accepts a transaction as soon
    /// as the node has processed it, including ones that failed on chain.
    #[default]
    AnyStatus,
    /// Only `confirmed` or `finalized` statuses count.
    ConfirmedOrFinalized,
}

impl StatusRule {
    /// Parses `any` / `confirmed` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" | "any_status" => Some(Self::AnyStatus),
            "confirmed" | "confirmed_or_finalized" => Some(Self::ConfirmedOrFinalized),
            _ => None,
        }
    }
}

/// Retry, polling, and fee tuning for [`crate::submit::TransferSubmitter`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SubmitConfig {
    /// Maximum number of broadcasts for one submission.
    pub max_attempts: u32,
    /// Delay between signature-status polls.
    pub poll_interval: Duration,
    /// Blocks subtracted from the window end before treating it as expired.
    pub expiry_margin_blocks: u64,
    /// Commitment used for blockhash and block-height queries.
    pub commitment: CommitmentLevel,
    /// Confirmation acceptance rule.
    pub status_rule: StatusRule,
    /// Optional cap on status polls per attempt; `None` polls until confirmed or expired.
    pub max_polls_per_attempt: Option<u32>,
    /// Optional compute unit limit prefixed to every transaction.
    pub compute_unit_limit: Option<u32>,
    /// Optional priority fee (micro-lamports per compute unit).
    pub priority_fee_micro_lamports: Option<u64>,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            expiry_margin_blocks: DEFAULT_EXPIRY_MARGIN_BLOCKS,
            commitment: CommitmentLevel::Finalized,
            status_rule: StatusRule::default(),
            max_polls_per_attempt: None,
            compute_unit_limit: None,
            priority_fee_micro_lamports: None,
        }
    }
}

impl SubmitConfig {
    /// Loads a config from `SOF_TRANSFER_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: read_parsed_env::<u32>("SOF_TRANSFER_MAX_ATTEMPTS")
                .filter(|value| *value > 0)
                .map(|value| value.min(64))
                .unwrap_or(defaults.max_attempts),
            poll_interval: read_parsed_env::<u64>("SOF_TRANSFER_POLL_INTERVAL_MS")
                .filter(|value| *value > 0)
                .map_or(defaults.poll_interval, Duration::from_millis),
            expiry_margin_blocks: read_parsed_env::<u64>("SOF_TRANSFER_EXPIRY_MARGIN_BLOCKS")
                .unwrap_or(defaults.expiry_margin_blocks),
            commitment: read_parsed_env::<CommitmentLevel>("SOF_TRANSFER_COMMITMENT")
                .unwrap_or(defaults.commitment),
            status_rule: read_env_var("SOF_TRANSFER_STATUS_RULE")
                .and_then(|value| StatusRule::parse(&value))
                .unwrap_or(defaults.status_rule),
            max_polls_per_attempt: read_parsed_env::<u32>("SOF_TRANSFER_MAX_POLLS")
                .filter(|value| *value > 0),
            compute_unit_limit: read_parsed_env::<u32>("SOF_TRANSFER_COMPUTE_UNIT_LIMIT")
                .filter(|value| *value > 0),
            priority_fee_micro_lamports: read_parsed_env::<u64>("SOF_TRANSFER_PRIORITY_FEE")
                .filter(|value| *value > 0),
        }
        .normalized()
    }

    /// Returns this config with bounded minimums.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            max_attempts: self.max_attempts.max(1),
            ..self
        }
    }
}

/// Tuning for [`crate::ledger::JsonRpcLedger`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RpcLedgerConfig {
    /// Skip preflight simulation on `sendTransaction`.
    pub skip_preflight: bool,
    /// Optional preflight commitment.
    pub preflight_commitment: Option<CommitmentLevel>,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for RpcLedgerConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: None,
            request_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl RpcLedgerConfig {
    /// Loads a config from `SOF_TRANSFER_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            skip_preflight: read_bool_env("SOF_TRANSFER_SKIP_PREFLIGHT", defaults.skip_preflight),
            preflight_commitment: read_parsed_env::<CommitmentLevel>(
                "SOF_TRANSFER_PREFLIGHT_COMMITMENT",
            ),
            request_timeout: read_parsed_env::<u64>("SOF_TRANSFER_RPC_TIMEOUT_MS")
                .filter(|value| *value > 0)
                .map_or(defaults.request_timeout, Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = SubmitConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.poll_interval, Duration::from_millis(2_500));
        assert_eq!(config.expiry_margin_blocks, 150);
        assert_eq!(config.commitment, CommitmentLevel::Finalized);
        assert_eq!(config.status_rule, StatusRule::AnyStatus);
        assert_eq!(config.max_polls_per_attempt, None);
    }

    #[test]
    fn status_rule_parses_known_names() {
        assert_eq!(StatusRule::parse("ANY"), Some(StatusRule::AnyStatus));
        assert_eq!(
            StatusRule::parse(" confirmed "),
            Some(StatusRule::ConfirmedOrFinalized)
        );
        assert_eq!(StatusRule::parse("finalised"), None);
    }

    // Overrides are process-global, so every override-driven assertion lives in this one test.
    #[test]
    fn from_env_reads_overrides_and_filters_invalid_values() {
        set_env_overrides([
            ("SOF_TRANSFER_MAX_ATTEMPTS".to_owned(), "0".to_owned()),
            ("SOF_TRANSFER_POLL_INTERVAL_MS".to_owned(), "100".to_owned()),
            ("SOF_TRANSFER_COMMITMENT".to_owned(), "confirmed".to_owned()),
            ("SOF_TRANSFER_STATUS_RULE".to_owned(), "confirmed".to_owned()),
            ("SOF_TRANSFER_MAX_POLLS".to_owned(), "3".to_owned()),
            ("SOF_TRANSFER_SKIP_PREFLIGHT".to_owned(), "yes".to_owned()),
        ]);
        let submit = SubmitConfig::from_env();
        let rpc = RpcLedgerConfig::from_env();
        assert_eq!(read_env_var("SOF_TRANSFER_MAX_POLLS").as_deref(), Some("3"));

        set_env_overrides([("SOF_TRANSFER_MAX_ATTEMPTS".to_owned(), "7".to_owned())]);
        assert_eq!(SubmitConfig::from_env().max_attempts, 7);
        assert_eq!(
            read_env_var("SOF_TRANSFER_MAX_POLLS"),
            std::env::var("SOF_TRANSFER_MAX_POLLS").ok()
        );

        clear_env_overrides();
        assert_eq!(
            read_env_var("SOF_TRANSFER_MAX_ATTEMPTS"),
            std::env::var("SOF_TRANSFER_MAX_ATTEMPTS").ok()
        );

        assert_eq!(submit.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(submit.poll_interval, Duration::from_millis(100));
        assert_eq!(submit.commitment, CommitmentLevel::Confirmed);
        assert_eq!(submit.status_rule, StatusRule::ConfirmedOrFinalized);
        assert_eq!(submit.max_polls_per_attempt, Some(3));
        assert!(rpc.skip_preflight);
        assert_eq!(rpc.request_timeout, DEFAULT_RPC_TIMEOUT);
        assert_eq!(read_env_var("SOF_TRANSFER_MAX_POLLS_UNSET_FOR_TEST"), None);
    }
}
