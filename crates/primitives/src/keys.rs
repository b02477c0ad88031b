//! Public keys of the supported signature scheme (ed25519).

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{address::Address, errors::KeyError};

/// Fixed size of an ed25519 public key.
pub const ED25519_PUBKEY_LEN: usize = 32;

/// Raw ed25519 public key bytes.
///
/// Construction only checks the length.  Whether the bytes are a valid curve
/// point is only checked when verifying a signature.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, BorshSerialize, BorshDeserialize)]
pub struct PubKeyEd25519([u8; ED25519_PUBKEY_LEN]);

impl_buf_wrapper!(PubKeyEd25519, ED25519_PUBKEY_LEN);

impl PubKeyEd25519 {
    /// Constructs a key from a slice.  Any length other than 32 bytes is an
    /// error; short input is never padded.
    pub fn from_slice(buf: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; ED25519_PUBKEY_LEN] =
            buf.try_into().map_err(|_| KeyError::InvalidLength {
                expected: ED25519_PUBKEY_LEN,
                got: buf.len(),
            })?;
        Ok(Self(arr))
    }

    /// Decodes a key from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        let raw = STANDARD.decode(s).map_err(|_| KeyError::Malformed)?;
        Self::from_slice(&raw)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// The address controlled by this key, the first 20 bytes of its SHA-256.
    pub fn address(&self) -> Address {
        Address::from_hash_of(&self.0)
    }

    /// Verifies an ed25519 signature over `msg`.
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), KeyError> {
        let vk = VerifyingKey::from_bytes(&self.0).map_err(|_| KeyError::Malformed)?;
        let sig = Signature::from_slice(sig).map_err(|_| KeyError::MalformedSignature)?;
        vk.verify(msg, &sig).map_err(|_| KeyError::BadSignature)
    }
}

impl From<VerifyingKey> for PubKeyEd25519 {
    fn from(vk: VerifyingKey) -> Self {
        Self(vk.to_bytes())
    }
}

impl fmt::Debug for PubKeyEd25519 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKeyEd25519({})", hex::encode(self.0))
    }
}

impl fmt::Display for PubKeyEd25519 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for PubKeyEd25519 {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PubKeyEd25519 {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize<'de>>::deserialize(d)?;
        PubKeyEd25519::from_base64(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn test_key() -> SigningKey {
        SigningKey::from_bytes(&[3u8; 32])
    }

    #[test]
    fn test_verify_roundtrip() {
        let sk = test_key();
        let pk = PubKeyEd25519::from(sk.verifying_key());
        let sig = sk.sign(b"hello");
        pk.verify(b"hello", &sig.to_bytes()).unwrap();
        assert_eq!(
            pk.verify(b"hellp", &sig.to_bytes()),
            Err(KeyError::BadSignature)
        );
    }

    #[test]
    fn test_short_key_is_rejected() {
        let short = STANDARD.encode([1u8; 16]);
        assert_eq!(
            PubKeyEd25519::from_base64(&short),
            Err(KeyError::InvalidLength {
                expected: 32,
                got: 16
            })
        );
    }

    #[test]
    fn test_long_key_is_rejected() {
        assert!(matches!(
            PubKeyEd25519::from_slice(&[1u8; 33]),
            Err(KeyError::InvalidLength { got: 33, .. })
        ));
    }

    #[test]
    fn test_address_is_hash_prefix() {
        let pk = PubKeyEd25519::new([9; 32]);
        let digest = crate::hash::raw(&[9; 32]);
        assert_eq!(pk.address().as_bytes(), &digest.as_bytes()[..20]);
    }
}
