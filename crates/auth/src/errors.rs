use tessel_primitives::{Address, KeyError};
use tessel_sdk::SdkError;
use tessel_store::StoreError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account {0} does not exist")]
    AccountNotFound(Address),

    #[error("account {0} already exists")]
    AccountExists(Address),

    #[error("auth params missing from context")]
    MissingParams,

    #[error("transaction has no messages")]
    NoMessages,

    #[error("transaction has no signers")]
    NoSigners,

    #[error("wrong number of signatures (expected {expected}, got {got})")]
    WrongSignatureCount { expected: usize, got: usize },

    #[error("too many signatures (limit {limit}, got {got})")]
    TooManySignatures { limit: usize, got: usize },

    #[error("memo too large (limit {limit}, got {got})")]
    MemoTooLarge { limit: usize, got: usize },

    #[error("public key does not match signer {0}")]
    PubKeyMismatch(Address),

    #[error("no public key known for signer {0}")]
    MissingPubKey(Address),

    #[error("signature of {addr}: {source}")]
    Signature {
        addr: Address,
        #[source]
        source: KeyError,
    },

    #[error("fee payment by {payer}: {reason}")]
    FeePayment { payer: Address, reason: String },

    #[error("unknown auth message '{0}'")]
    UnknownMsg(String),

    #[error("account number overflow")]
    AccountNumberOverflow,

    #[error("codec: {0}")]
    Codec(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("sdk: {0}")]
    Sdk(#[from] SdkError),
}
