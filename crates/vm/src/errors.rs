use tessel_auth::AuthError;
use tessel_bank::BankError;
use tessel_primitives::Address;
use tessel_sdk::SdkError;
use tessel_store::StoreError;
use thiserror::Error;

pub type VmResult<T> = Result<T, VmError>;

/// Errors raised by a contract runtime while executing package code.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no implementation for package '{0}'")]
    UnknownPackage(String),

    #[error("package '{pkg}' has no function '{func}'")]
    UnknownFunction { pkg: String, func: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("caller {0} is not allowed")]
    Unauthorized(Address),

    #[error("realm state: {0}")]
    State(String),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum VmError {
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    #[error("package '{0}' already exists")]
    PackageExists(String),

    #[error("package '{0}' not found")]
    PackageNotFound(String),

    #[error("deployed package '{0}' has no runtime implementation")]
    MissingImplementation(String),

    #[error("unknown vm message '{0}'")]
    UnknownMsg(String),

    #[error("{pkg}.{func}: {source}")]
    Call {
        pkg: String,
        func: String,
        #[source]
        source: RuntimeError,
    },

    #[error("runtime: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("bank: {0}")]
    Bank(#[from] BankError),

    #[error("codec: {0}")]
    Codec(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("sdk: {0}")]
    Sdk(#[from] SdkError),
}
