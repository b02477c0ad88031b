//! Node configuration, deserialized from TOML.

mod config;

pub use config::{
    AnteConfig, AppConfig, Config, LoggingConfig, StoreConfig, DEFAULT_VALSET_FUNC,
    DEFAULT_VALSET_PKG_PATH,
};
