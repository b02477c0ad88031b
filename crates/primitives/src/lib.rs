//! Collection of generic data types that are used widely across the
//! application layer: addresses, coins, hashes and public keys.

#[macro_use]
mod macros;

pub mod address;
pub mod buf;
pub mod coin;
pub mod errors;
pub mod hash;
pub mod keys;
pub mod serde_helpers;

pub use address::{ADDRESS_HRP, ADDRESS_LEN, Address};
pub use buf::Buf32;
pub use coin::{Coin, Coins};
pub use errors::{AddressError, CoinError, KeyError};
pub use keys::{ED25519_PUBKEY_LEN, PubKeyEd25519};
