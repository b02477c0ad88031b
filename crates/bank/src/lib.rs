//! Fungible balances, the send message and its handler.

mod errors;
mod handler;
mod keeper;
mod msgs;

pub use errors::{BankError, BankResult};
pub use handler::BankHandler;
pub use keeper::BankKeeper;
pub use msgs::MsgSend;

/// Route of bank messages.
pub const ROUTE: &str = "bank";
