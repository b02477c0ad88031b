//! Account addresses.

use std::{fmt, str::FromStr};

use bech32::{Bech32, Hrp};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{errors::AddressError, hash};

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Human readable part used in the bech32 form of addresses.
pub const ADDRESS_HRP: &str = "g";

const HRP: Hrp = Hrp::parse_unchecked(ADDRESS_HRP);

/// A 20-byte account address, rendered as bech32.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Address([u8; ADDRESS_LEN]);

impl_buf_wrapper!(Address, ADDRESS_LEN);

impl Address {
    /// Constructs an address from a slice, checking its length.
    pub fn from_slice(buf: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LEN] =
            buf.try_into().map_err(|_| AddressError::WrongLength {
                expected: ADDRESS_LEN,
                got: buf.len(),
            })?;
        Ok(Self(arr))
    }

    /// Derives an address from the first 20 bytes of the SHA-256 hash of the
    /// input.
    pub fn from_hash_of(buf: &[u8]) -> Self {
        let digest = hash::raw(buf);
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&digest.as_bytes()[..ADDRESS_LEN]);
        Self(arr)
    }

    /// Derives a module-owned address from a module name, for accounts that
    /// have no key (fee collector, packages).
    pub fn derive_module(module: &str, name: &str) -> Self {
        Self::from_hash_of(format!("{module}:{name}").as_bytes())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bech32::encode_to_fmt::<Bech32, _>(f, HRP, &self.0).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data) = bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
        if !hrp.as_str().eq_ignore_ascii_case(ADDRESS_HRP) {
            return Err(AddressError::WrongPrefix {
                expected: ADDRESS_HRP,
                got: hrp.to_string(),
            });
        }
        Self::from_slice(&data)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize<'de>>::deserialize(d)?;
        Address::from_str(&s).map_err(D::Error::custom)
    }
}
