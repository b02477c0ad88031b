//! Fungible coin amounts.

use std::{collections::BTreeMap, fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::errors::CoinError;

const MIN_DENOM_LEN: usize = 3;
const MAX_DENOM_LEN: usize = 128;

/// An amount of a single denomination.
#[derive(Clone, Debug, Eq, PartialEq, Hash, BorshSerialize, BorshDeserialize)]
pub struct Coin {
    denom: String,
    amount: u64,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u64) -> Result<Self, CoinError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { denom, amount })
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Checks a denomination: a lowercase letter followed by 2 to 127 lowercase
/// alphanumerics or `/`.
fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let len_ok = (MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&denom.len());
    let mut chars = denom.chars();
    let head_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let tail_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '/');
    if len_ok && head_ok && tail_ok {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_owned()))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoinError::Empty);
        }

        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(CoinError::MissingAmount(s.to_owned()));
        }

        let amount = amount
            .parse::<u64>()
            .map_err(|_| CoinError::InvalidAmount(s.to_owned()))?;
        Coin::new(denom.trim(), amount)
    }
}

/// A set of coins, sorted by denomination, with no duplicates and no zero
/// amounts.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, BorshSerialize, BorshDeserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Normalizes a list of coins.  Zero amounts are dropped, the rest is
    /// sorted, and repeated denominations are rejected.
    pub fn from_vec(mut coins: Vec<Coin>) -> Result<Self, CoinError> {
        coins.retain(|c| c.amount > 0);
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        for pair in coins.windows(2) {
            if pair[0].denom == pair[1].denom {
                return Err(CoinError::DuplicateDenom(pair[0].denom.clone()));
            }
        }
        Ok(Self(coins))
    }

    /// Convenience for a single-denomination set.
    pub fn single(denom: impl Into<String>, amount: u64) -> Result<Self, CoinError> {
        Self::from_vec(vec![Coin::new(denom, amount)?])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// Returns the amount of a denomination, zero if absent.
    pub fn amount_of(&self, denom: &str) -> u64 {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(0)
    }

    /// Returns if every denomination in `other` is covered by `self`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }

    /// Adds two sets, failing if any denomination overflows.
    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinError> {
        let mut merged: BTreeMap<&str, u64> = BTreeMap::new();
        for c in self.0.iter().chain(other.0.iter()) {
            let slot = merged.entry(c.denom.as_str()).or_insert(0);
            *slot = slot
                .checked_add(c.amount)
                .ok_or_else(|| CoinError::Overflow(c.denom.clone()))?;
        }

        let out = merged
            .into_iter()
            .map(|(denom, amount)| Coin {
                denom: denom.to_owned(),
                amount,
            })
            .collect();
        Ok(Self(out))
    }

    /// Subtracts `other` from `self`, failing if any denomination would go
    /// negative.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinError> {
        if !self.is_all_gte(other) {
            return Err(CoinError::Insufficient {
                have: self.to_string(),
                need: other.to_string(),
            });
        }

        let out = self
            .0
            .iter()
            .filter_map(|c| {
                let amount = c.amount - other.amount_of(&c.denom);
                (amount > 0).then(|| Coin {
                    denom: c.denom.clone(),
                    amount,
                })
            })
            .collect();
        Ok(Self(out))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Coins {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }

        let coins = s
            .split(',')
            .map(Coin::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_vec(coins)
    }
}

impl Serialize for Coins {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize<'de>>::deserialize(d)?;
        Coins::from_str(&s).map_err(D::Error::custom)
    }
}
