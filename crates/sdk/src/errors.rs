use thiserror::Error;

use crate::StepKind;

/// Error type returned across the handler and ante step seams.  Module errors
/// are boxed into it with `?`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("route '{0}' already registered")]
    DuplicateRoute(String),

    #[error("ante step '{0}' already present")]
    DuplicateStep(String),

    #[error("unknown ante step '{0}'")]
    UnknownStep(String),

    #[error("ante step '{name}' is {expected:?}, replacement is {got:?}")]
    StepKindMismatch {
        name: String,
        expected: StepKind,
        got: StepKind,
    },

    #[error("ante step '{0}' augments the context and cannot be removed")]
    CannotRemoveAugment(String),

    #[error("expected message {expected}, got {got}")]
    WrongMsgType { expected: String, got: String },

    #[error("message signers do not match its payload")]
    SignerMismatch,

    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("encode: {0}")]
    Encode(#[source] serde_json::Error),
}
