use serde::{Deserialize, Serialize};
use tessel_primitives::Address;

/// Parameters the ante steps and modules read from the context.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthParams {
    pub max_memo_bytes: usize,
    pub tx_sig_limit: usize,

    /// Account receiving transaction fees.
    pub fee_collector: Address,
}

impl AuthParams {
    pub const DEFAULT_MAX_MEMO_BYTES: usize = 65_536;
    pub const DEFAULT_TX_SIG_LIMIT: usize = 7;

    pub fn default_fee_collector() -> Address {
        Address::derive_module("auth", "fee_collector")
    }
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_bytes: Self::DEFAULT_MAX_MEMO_BYTES,
            tx_sig_limit: Self::DEFAULT_TX_SIG_LIMIT,
            fee_collector: Self::default_fee_collector(),
        }
    }
}
