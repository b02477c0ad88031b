use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, PubKeyEd25519};

/// On-chain identity record.
#[derive(Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,

    /// Bound the first time the account signs.
    pub pub_key: Option<PubKeyEd25519>,

    /// Assigned at creation, unique per chain.
    pub account_number: u64,

    /// Number of transactions this account has signed.
    pub sequence: u64,
}

impl Account {
    pub fn new(address: Address, account_number: u64) -> Self {
        Self {
            address,
            pub_key: None,
            account_number,
            sequence: 0,
        }
    }
}
