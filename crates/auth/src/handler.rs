use tessel_sdk::{Context, HandlerError, Msg, MsgHandler};

use crate::AuthError;

/// Handler for the `auth` route.  Accounts only change through the ante steps
/// and other modules, so every message sent here is rejected.
#[derive(Copy, Clone, Debug, Default)]
pub struct AuthHandler;

impl MsgHandler for AuthHandler {
    fn handle(&self, _ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, HandlerError> {
        Err(AuthError::UnknownMsg(msg.kind.clone()).into())
    }
}
