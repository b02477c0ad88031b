//! The application state machine driven by consensus.
//!
//! [`App`] wires the stores, keepers, ante pipeline and router together and
//! exposes the block lifecycle: `init_chain`, then repeated
//! `begin_block` / `deliver_tx` / `end_block` / `commit`.  Validator sets are
//! read from a contract by the [`ValsetOracle`].

mod app;
mod errors;
mod genesis;
mod valset;

pub use app::{App, AppInfo, EndBlockResponse, BASE_STORE, MAIN_STORE};
pub use errors::{AppError, AppResult, GenesisError, ValsetError};
pub use genesis::{BalanceSeed, FailedGenesisTx, GenesisState, InitChainRequest, InitChainResponse};
pub use valset::{ValidatorUpdate, ValsetOracle, decode_validator_set};
