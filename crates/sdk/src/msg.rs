//! Message envelopes.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tessel_primitives::Address;

use crate::{SdkError, SdkResult};

/// A message inside a transaction: a route, a kind within that route, the
/// addresses that must sign it and the JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    pub route: String,
    pub kind: String,
    pub signers: Vec<Address>,
    pub value: serde_json::Value,
}

/// A concrete message type carried in a [`Msg`].
pub trait TypedMsg: Serialize + DeserializeOwned {
    const ROUTE: &'static str;
    const KIND: &'static str;

    /// Addresses whose signatures authorize this message.
    fn signers(&self) -> Vec<Address>;
}

impl Msg {
    /// Wraps a typed message.
    pub fn new<M: TypedMsg>(msg: &M) -> SdkResult<Self> {
        Ok(Self {
            route: M::ROUTE.to_owned(),
            kind: M::KIND.to_owned(),
            signers: msg.signers(),
            value: serde_json::to_value(msg).map_err(SdkError::Encode)?,
        })
    }

    pub fn is<M: TypedMsg>(&self) -> bool {
        self.route == M::ROUTE && self.kind == M::KIND
    }

    /// Unwraps a typed message, checking that the declared signers are the
    /// ones the payload names.
    pub fn decode<M: TypedMsg>(&self) -> SdkResult<M> {
        if !self.is::<M>() {
            return Err(SdkError::WrongMsgType {
                expected: format!("{}/{}", M::ROUTE, M::KIND),
                got: format!("{}/{}", self.route, self.kind),
            });
        }
        let msg: M = serde_json::from_value(self.value.clone()).map_err(SdkError::Decode)?;
        if msg.signers() != self.signers {
            return Err(SdkError::SignerMismatch);
        }
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        from: Address,
        n: u32,
    }

    impl TypedMsg for Ping {
        const ROUTE: &'static str = "test";
        const KIND: &'static str = "ping";

        fn signers(&self) -> Vec<Address> {
            vec![self.from]
        }
    }

    #[test]
    fn test_wrap_and_decode() {
        let ping = Ping {
            from: Address::new([1; 20]),
            n: 4,
        };
        let msg = Msg::new(&ping).unwrap();
        assert_eq!(msg.route, "test");
        assert_eq!(msg.signers, vec![ping.from]);
        assert_eq!(msg.decode::<Ping>().unwrap(), ping);
    }

    #[test]
    fn test_forged_signers_rejected() {
        let ping = Ping {
            from: Address::new([1; 20]),
            n: 4,
        };
        let mut msg = Msg::new(&ping).unwrap();
        msg.signers = vec![Address::new([2; 20])];
        assert!(matches!(
            msg.decode::<Ping>(),
            Err(SdkError::SignerMismatch)
        ));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let ping = Ping {
            from: Address::new([1; 20]),
            n: 4,
        };
        let mut msg = Msg::new(&ping).unwrap();
        msg.kind = "pong".to_owned();
        assert!(matches!(
            msg.decode::<Ping>(),
            Err(SdkError::WrongMsgType { .. })
        ));
    }
}
