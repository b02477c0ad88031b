//! Accounts: identity records, the auth parameters and the default ante
//! steps.

mod account;
pub mod ante;
mod errors;
mod handler;
mod keeper;
mod params;

pub use account::Account;
pub use errors::{AuthError, AuthResult};
pub use handler::AuthHandler;
pub use keeper::AccountKeeper;
pub use params::AuthParams;

/// Route of auth messages.
pub const ROUTE: &str = "auth";
