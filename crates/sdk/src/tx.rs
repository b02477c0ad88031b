//! Transactions and their sign documents.

use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, Coins, PubKeyEd25519, serde_helpers::serde_base64};

use crate::{Msg, SdkError, SdkResult};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub gas_wanted: u64,
    pub gas_fee: Coins,
}

/// One signature per signer, in signer order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TxSignature {
    /// Required the first time an account signs, optional afterwards.
    #[serde(default)]
    pub pub_key: Option<PubKeyEd25519>,

    #[serde(with = "serde_base64")]
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    pub msgs: Vec<Msg>,
    pub fee: Fee,
    #[serde(default)]
    pub signatures: Vec<TxSignature>,
    #[serde(default)]
    pub memo: String,
}

/// The document a signer signs over.
#[derive(Debug, Serialize)]
pub struct SignDoc<'a> {
    pub chain_id: &'a str,
    pub account_number: u64,
    pub sequence: u64,
    pub fee: &'a Fee,
    pub msgs: &'a [Msg],
    pub memo: &'a str,
}

impl Tx {
    /// Decodes a transaction from its JSON wire form.
    pub fn from_bytes(buf: &[u8]) -> SdkResult<Self> {
        serde_json::from_slice(buf).map_err(SdkError::Decode)
    }

    pub fn to_bytes(&self) -> SdkResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(SdkError::Encode)
    }

    /// Signers of all messages, deduplicated, in order of first appearance.
    pub fn signers(&self) -> Vec<Address> {
        let mut out: Vec<Address> = Vec::new();
        for addr in self.msgs.iter().flat_map(|m| m.signers.iter()) {
            if !out.contains(addr) {
                out.push(*addr);
            }
        }
        out
    }

    /// Bytes a signer with the given account number and sequence signs.
    pub fn sign_bytes(
        &self,
        chain_id: &str,
        account_number: u64,
        sequence: u64,
    ) -> SdkResult<Vec<u8>> {
        let doc = SignDoc {
            chain_id,
            account_number,
            sequence,
            fee: &self.fee,
            msgs: &self.msgs,
            memo: &self.memo,
        };
        serde_json::to_vec(&doc).map_err(SdkError::Encode)
    }
}
