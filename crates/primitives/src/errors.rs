//! Errors during parsing/handling/conversion of primitives.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("bech32: {0}")]
    Bech32(String),

    #[error("wrong address prefix (expected {expected}, got {got})")]
    WrongPrefix { expected: &'static str, got: String },

    #[error("wrong address length (expected {expected}, got {got})")]
    WrongLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoinError {
    #[error("empty coin string")]
    Empty,

    #[error("missing amount in coin '{0}'")]
    MissingAmount(String),

    #[error("invalid amount in coin '{0}'")]
    InvalidAmount(String),

    #[error("invalid denomination '{0}'")]
    InvalidDenom(String),

    #[error("duplicate denomination '{0}'")]
    DuplicateDenom(String),

    #[error("coin amount overflow for {0}")]
    Overflow(String),

    #[error("insufficient coins: have {have}, need {need}")]
    Insufficient { have: String, need: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid public key length (expected {expected}, got {got})")]
    InvalidLength { expected: usize, got: usize },

    #[error("malformed public key")]
    Malformed,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature verification failed")]
    BadSignature,
}
