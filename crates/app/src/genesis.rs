//! Genesis input and output types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, Coins};
use tessel_sdk::Tx;

use crate::{GenesisError, ValidatorUpdate};

/// Initial balance of one account, written `<address>=<coins>` as in
/// `g1...=100ugnot,5foo`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BalanceSeed {
    pub address: Address,
    pub amount: Coins,
}

impl FromStr for BalanceSeed {
    type Err = GenesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, coins) = s
            .split_once('=')
            .ok_or_else(|| GenesisError::MalformedSeed(s.to_owned()))?;
        if coins.contains('=') {
            return Err(GenesisError::MalformedSeed(s.to_owned()));
        }

        let address = addr.trim().parse().map_err(|source| GenesisError::SeedAddress {
            seed: s.to_owned(),
            source,
        })?;
        let amount = coins.trim().parse().map_err(|source| GenesisError::SeedCoins {
            seed: s.to_owned(),
            source,
        })?;
        Ok(Self { address, amount })
    }
}

impl TryFrom<String> for BalanceSeed {
    type Error = GenesisError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BalanceSeed> for String {
    fn from(seed: BalanceSeed) -> Self {
        seed.to_string()
    }
}

impl fmt::Display for BalanceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.address, self.amount)
    }
}

/// Application part of the genesis document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub balances: Vec<BalanceSeed>,

    /// Delivered in order at height 0.
    #[serde(default)]
    pub txs: Vec<Tx>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitChainRequest {
    pub chain_id: String,

    /// Genesis time, seconds since the unix epoch.
    #[serde(default)]
    pub time: u64,

    /// Decoded into [`GenesisState`].
    pub app_state: serde_json::Value,
}

/// A genesis transaction skipped because it failed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FailedGenesisTx {
    pub index: usize,
    pub log: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InitChainResponse {
    pub validators: Vec<ValidatorUpdate>,
    pub failed_genesis_txs: Vec<FailedGenesisTx>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        Address::new([7; 20])
    }

    #[test]
    fn test_balance_seed_roundtrip() {
        let s = format!("{}=10ugnot,3zzz", addr());
        let seed = BalanceSeed::from_str(&s).unwrap();
        assert_eq!(seed.address, addr());
        assert_eq!(seed.amount.amount_of("ugnot"), 10);
        assert_eq!(seed.amount.amount_of("zzz"), 3);
        assert_eq!(seed.to_string(), s);
        assert_eq!(BalanceSeed::from_str(&seed.to_string()).unwrap(), seed);
    }

    #[test]
    fn test_balance_seed_errors() {
        assert!(matches!(
            BalanceSeed::from_str("no-separator"),
            Err(GenesisError::MalformedSeed(_))
        ));
        assert!(matches!(
            BalanceSeed::from_str(&format!("{}=1ugnot=2", addr())),
            Err(GenesisError::MalformedSeed(_))
        ));
        assert!(matches!(
            BalanceSeed::from_str("notanaddress=1ugnot"),
            Err(GenesisError::SeedAddress { .. })
        ));
        assert!(matches!(
            BalanceSeed::from_str(&format!("{}=ugnot", addr())),
            Err(GenesisError::SeedCoins { .. })
        ));
    }

    #[test]
    fn test_genesis_state_json() {
        let json = serde_json::json!({
            "balances": [format!("{}=5ugnot", addr())],
        });
        let state: GenesisState = serde_json::from_value(json).unwrap();
        assert_eq!(state.balances.len(), 1);
        assert!(state.txs.is_empty());

        let bad = serde_json::json!({ "balances": ["garbage"] });
        assert!(serde_json::from_value::<GenesisState>(bad).is_err());

        let wrong_shape = serde_json::json!({ "balances": 3 });
        assert!(serde_json::from_value::<GenesisState>(wrong_shape).is_err());
    }
}
