//! Execution-time building blocks shared by every module: the per-transaction
//! context, messages and transactions, the router and the ante pipeline.

mod ante;
mod context;
mod errors;
mod msg;
mod result;
mod router;
mod tx;

pub use ante::{AnteError, AntePipeline, AnteStep, StepKind};
pub use context::{BlockHeader, Context, Event};
pub use errors::{HandlerError, SdkError, SdkResult};
pub use msg::{Msg, TypedMsg};
pub use result::{TxResult, TxStage};
pub use router::{MsgHandler, RouteError, Router};
pub use tx::{Fee, SignDoc, Tx, TxSignature};
