use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, Coins};
use tessel_sdk::TypedMsg;

/// Moves coins from one account to another.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coins,
}

impl TypedMsg for MsgSend {
    const ROUTE: &'static str = crate::ROUTE;
    const KIND: &'static str = "send";

    fn signers(&self) -> Vec<Address> {
        vec![self.from_address]
    }
}
