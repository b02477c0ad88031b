use tessel_auth::AuthError;
use tessel_primitives::{Address, CoinError};
use tessel_sdk::SdkError;
use tessel_store::StoreError;
use thiserror::Error;

pub type BankResult<T> = Result<T, BankError>;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("insufficient funds in {addr}: {source}")]
    InsufficientFunds {
        addr: Address,
        #[source]
        source: CoinError,
    },

    #[error("balance of {addr}: {source}")]
    Overflow {
        addr: Address,
        #[source]
        source: CoinError,
    },

    #[error("account {0} does not exist")]
    NoAccount(Address),

    #[error("send amount is empty")]
    EmptyAmount,

    #[error("unknown bank message '{0}'")]
    UnknownMsg(String),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("codec: {0}")]
    Codec(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("sdk: {0}")]
    Sdk(#[from] SdkError),
}
