use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, Coins};
use tessel_sdk::TypedMsg;

use crate::MemPackage;

/// Deploys a package.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MsgAddPackage {
    pub creator: Address,
    pub package: MemPackage,
    #[serde(default)]
    pub deposit: Coins,
}

impl TypedMsg for MsgAddPackage {
    const ROUTE: &'static str = crate::ROUTE;
    const KIND: &'static str = "add_package";

    fn signers(&self) -> Vec<Address> {
        vec![self.creator]
    }
}

/// Calls an exported function of a deployed package.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MsgCall {
    pub caller: Address,
    #[serde(default)]
    pub send: Coins,
    pub pkg_path: String,
    pub func: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl TypedMsg for MsgCall {
    const ROUTE: &'static str = crate::ROUTE;
    const KIND: &'static str = "exec";

    fn signers(&self) -> Vec<Address> {
        vec![self.caller]
    }
}
