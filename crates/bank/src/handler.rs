use tessel_sdk::{Context, HandlerError, Msg, MsgHandler, TypedMsg};

use crate::{BankError, BankKeeper, MsgSend};

/// Routes `bank` messages to the keeper.
#[derive(Clone, Debug)]
pub struct BankHandler {
    keeper: BankKeeper,
}

impl BankHandler {
    pub fn new(keeper: BankKeeper) -> Self {
        Self { keeper }
    }
}

impl MsgHandler for BankHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, HandlerError> {
        match msg.kind.as_str() {
            MsgSend::KIND => {
                let send = msg.decode::<MsgSend>()?;
                if send.amount.is_empty() {
                    return Err(BankError::EmptyAmount.into());
                }
                self.keeper
                    .send(ctx, &send.from_address, &send.to_address, &send.amount)?;
                Ok(Vec::new())
            }
            other => Err(BankError::UnknownMsg(other.to_owned()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tessel_auth::AccountKeeper;
    use tessel_primitives::{Address, Coins};
    use tessel_sdk::BlockHeader;
    use tessel_store::{CacheView, StoreKey};
    use tessel_test_utils::{MAIN_STORE, test_registry};

    use super::*;

    #[test]
    fn test_handle_send() {
        let reg = test_registry();
        let header = BlockHeader::default();
        let mut view = CacheView::new(&reg);
        let mut ctx = Context::new(&mut view, &header);
        let keeper = BankKeeper::new(AccountKeeper::new(StoreKey::new(MAIN_STORE)));
        let handler = BankHandler::new(keeper.clone());

        let (a, b) = (Address::new([1; 20]), Address::new([2; 20]));
        keeper
            .add(&mut ctx, &a, &Coins::from_str("5ugnot").unwrap())
            .unwrap();

        let send = MsgSend {
            from_address: a,
            to_address: b,
            amount: Coins::from_str("5ugnot").unwrap(),
        };
        handler.handle(&mut ctx, &Msg::new(&send).unwrap()).unwrap();
        assert_eq!(keeper.get(&ctx, &b).unwrap().amount_of("ugnot"), 5);

        let err = handler
            .handle(&mut ctx, &Msg::new(&send).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("insufficient"));

        let mut unknown = Msg::new(&send).unwrap();
        unknown.kind = "burn".to_owned();
        assert!(handler.handle(&mut ctx, &unknown).is_err());
    }
}
