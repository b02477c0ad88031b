//! Error types for initialization and configuration.

use std::{io, path::PathBuf};

use format_serde_error::SerdeError;
use tessel_app::AppError;
use tessel_common::logging::LoggingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid datadir path: {0:?}")]
    InvalidDatadirPath(PathBuf),

    #[error("unparsable input file: {0}")]
    UnparsableFile(#[from] SerdeError),

    #[error("config: {0}")]
    MalformedConfig(#[from] ConfigError),

    #[error("toml: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to build runtime: {0}")]
    RuntimeBuild(#[source] io::Error),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("app: {0}")]
    App(#[from] AppError),
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// Tried to traverse into a primitive.
    #[error("can't traverse into non-table key '{key}' of '{path}'")]
    TraverseNonTableAt { key: String, path: String },

    /// Invalid override string.
    #[error("invalid override: '{0}'")]
    InvalidOverride(String),
}
