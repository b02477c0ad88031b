use tessel_auth::AuthError;
use tessel_bank::BankError;
use tessel_primitives::{AddressError, CoinError, KeyError};
use tessel_sdk::SdkError;
use tessel_store::StoreError;
use tessel_vm::VmError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{op} is not allowed in phase {phase}")]
    OutOfOrder {
        op: &'static str,
        phase: &'static str,
    },

    #[error("chain already initialized")]
    AlreadyInitialized,

    #[error("wrong chain id (expected {expected}, got {got})")]
    ChainIdMismatch { expected: String, got: String },

    #[error("wrong block height (expected {expected}, got {got})")]
    HeightMismatch { expected: u64, got: u64 },

    #[error("genesis: {0}")]
    Genesis(#[from] GenesisError),

    #[error("validator set: {0}")]
    Valset(#[from] ValsetError),

    #[error("vm: {0}")]
    Vm(#[from] VmError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("bank: {0}")]
    Bank(#[from] BankError),

    #[error("sdk: {0}")]
    Sdk(#[from] SdkError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("malformed app state: {0}")]
    AppState(#[source] serde_json::Error),

    #[error("balance seed '{0}' is not of the form <address>=<coins>")]
    MalformedSeed(String),

    #[error("balance seed '{seed}': {source}")]
    SeedAddress {
        seed: String,
        #[source]
        source: AddressError,
    },

    #[error("balance seed '{seed}': {source}")]
    SeedCoins {
        seed: String,
        #[source]
        source: CoinError,
    },

    #[error("genesis tx {index} failed: {log}")]
    TxFailed { index: usize, log: String },
}

#[derive(Debug, Error)]
pub enum ValsetError {
    #[error("unexpected result format: {0}")]
    Format(String),

    #[error("malformed validator list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validator {index}: {source}")]
    PubKey {
        index: usize,
        #[source]
        source: KeyError,
    },

    #[error("query: {0}")]
    Query(#[from] VmError),
}
