//! Fixtures shared by the tests of the application crates.

use ed25519_dalek::{Signer, SigningKey};
use tessel_primitives::{Address, PubKeyEd25519};
use tessel_sdk::{Tx, TxSignature};
use tessel_store::{BackendKind, StoreKey, StoreRegistry};

/// Deterministic ed25519 key for tests.
#[derive(Debug)]
pub struct TestKey {
    sk: SigningKey,
}

impl TestKey {
    /// Creates a key whose secret is `seed` repeated.  Different seeds give
    /// different keys.
    pub fn new(seed: u8) -> Self {
        Self {
            sk: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn pub_key(&self) -> PubKeyEd25519 {
        PubKeyEd25519::from(self.sk.verifying_key())
    }

    pub fn address(&self) -> Address {
        self.pub_key().address()
    }

    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        self.sk.sign(msg).to_bytes().to_vec()
    }
}

/// A signer of a transaction: its key and the account number and sequence
/// the signature commits to.
#[derive(Debug)]
pub struct SignerInfo<'k> {
    pub key: &'k TestKey,
    pub account_number: u64,
    pub sequence: u64,
}

impl<'k> SignerInfo<'k> {
    pub fn new(key: &'k TestKey, account_number: u64, sequence: u64) -> Self {
        Self {
            key,
            account_number,
            sequence,
        }
    }
}

/// Replaces the signatures of `tx`, one per entry of `signers`, each carrying
/// its public key.
pub fn sign_tx(tx: &mut Tx, chain_id: &str, signers: &[SignerInfo<'_>]) {
    tx.signatures = signers
        .iter()
        .map(|s| {
            let doc = tx
                .sign_bytes(chain_id, s.account_number, s.sequence)
                .expect("test: sign bytes");
            TxSignature {
                pub_key: Some(s.key.pub_key()),
                signature: s.key.sign(&doc),
            }
        })
        .collect();
}

/// Name of the merkleized store used by fixtures.
pub const MAIN_STORE: &str = "main";

/// Name of the durable, non-merkleized store used by fixtures.
pub const BASE_STORE: &str = "base";

/// Opens a temporary registry with the main and base stores mounted and
/// loaded.
pub fn test_registry() -> StoreRegistry {
    let mut reg = StoreRegistry::open_temporary().expect("test: open registry");
    reg.mount(&StoreKey::new(MAIN_STORE), BackendKind::Merkle)
        .expect("test: mount main");
    reg.mount(&StoreKey::new(BASE_STORE), BackendKind::Durable)
        .expect("test: mount base");
    reg.load_latest().expect("test: load");
    reg
}
