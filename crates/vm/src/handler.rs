use tessel_sdk::{Context, HandlerError, Msg, MsgHandler, TypedMsg};

use crate::{MsgAddPackage, MsgCall, VmError, VmKeeper};

/// Routes `vm` messages to the keeper.  Call results are returned as the
/// message data.
#[derive(Clone, Debug)]
pub struct VmHandler {
    keeper: VmKeeper,
}

impl VmHandler {
    pub fn new(keeper: VmKeeper) -> Self {
        Self { keeper }
    }
}

impl MsgHandler for VmHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, HandlerError> {
        match msg.kind.as_str() {
            MsgAddPackage::KIND => {
                let add = msg.decode::<MsgAddPackage>()?;
                let path = self
                    .keeper
                    .deploy(ctx, &add.creator, add.package, &add.deposit)?;
                Ok(path.into_bytes())
            }
            MsgCall::KIND => {
                let call = msg.decode::<MsgCall>()?;
                let out = self.keeper.call(
                    ctx,
                    &call.caller,
                    &call.send,
                    &call.pkg_path,
                    &call.func,
                    &call.args,
                )?;
                Ok(out.into_bytes())
            }
            other => Err(VmError::UnknownMsg(other.to_owned()).into()),
        }
    }
}
