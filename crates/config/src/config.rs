use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default value for `name` in [`AppConfig`].
const DEFAULT_APP_NAME: &str = "tessel";

/// Default value for `chain_id` in [`AppConfig`].
const DEFAULT_CHAIN_ID: &str = "dev";

/// Default package queried for the validator set.
pub const DEFAULT_VALSET_PKG_PATH: &str = "gno.land/r/validators";

/// Default function queried for the validator set.
pub const DEFAULT_VALSET_FUNC: &str = "ValidatorSet";

/// Default value for `datadir` in [`StoreConfig`].
const DEFAULT_DATADIR: &str = "tessel-data";

/// Default maximum memo size in bytes.
const DEFAULT_MAX_MEMO_BYTES: usize = 65_536;

/// Default maximum signatures per transaction.
const DEFAULT_TX_SIG_LIMIT: usize = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name reported by `info`.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version reported by `info`.
    #[serde(default = "default_app_version")]
    pub version: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    /// Keep going when a genesis transaction fails instead of aborting chain
    /// initialization.
    #[serde(default)]
    pub skip_failing_genesis_txs: bool,

    /// Check signatures of genesis transactions.  Off by default so that
    /// genesis files can be assembled without the signers' keys.
    #[serde(default)]
    pub verify_genesis_signatures: bool,

    /// Package queried for the validator set.
    #[serde(default = "default_valset_pkg_path")]
    pub valset_pkg_path: String,

    /// Function queried for the validator set.
    #[serde(default = "default_valset_func")]
    pub valset_func: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            chain_id: default_chain_id(),
            skip_failing_genesis_txs: false,
            verify_genesis_signatures: false,
            valset_pkg_path: default_valset_pkg_path(),
            valset_func: default_valset_func(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnteConfig {
    #[serde(default = "default_max_memo_bytes")]
    pub max_memo_bytes: usize,

    #[serde(default = "default_tx_sig_limit")]
    pub tx_sig_limit: usize,
}

impl Default for AnteConfig {
    fn default() -> Self {
        Self {
            max_memo_bytes: DEFAULT_MAX_MEMO_BYTES,
            tx_sig_limit: DEFAULT_TX_SIG_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// The data directory where database contents reside.
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
        }
    }
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_owned()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

fn default_chain_id() -> String {
    DEFAULT_CHAIN_ID.to_owned()
}

fn default_valset_pkg_path() -> String {
    DEFAULT_VALSET_PKG_PATH.to_owned()
}

fn default_valset_func() -> String {
    DEFAULT_VALSET_FUNC.to_owned()
}

fn default_datadir() -> PathBuf {
    DEFAULT_DATADIR.into()
}

fn default_max_memo_bytes() -> usize {
    DEFAULT_MAX_MEMO_BYTES
}

fn default_tx_sig_limit() -> usize {
    DEFAULT_TX_SIG_LIMIT
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// OpenTelemetry OTLP endpoint URL for distributed tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_url: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub ante: AnteConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}
