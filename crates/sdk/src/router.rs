//! Dispatch of messages to the module owning their route.

use std::{collections::BTreeMap, fmt};

use thiserror::Error;
use tracing::*;

use crate::{Context, HandlerError, Msg, SdkError, SdkResult};

/// Handles every message of one route.
pub trait MsgHandler {
    /// Executes the message, returning opaque result data.
    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, HandlerError>;
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route for '{0}'")]
    NoRoute(String),

    #[error("{route}/{kind}: {source}")]
    Handler {
        route: String,
        kind: String,
        #[source]
        source: HandlerError,
    },
}

/// Maps a route name to the handler responsible for it.
#[derive(Default)]
pub struct Router {
    routes: BTreeMap<String, Box<dyn MsgHandler>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for a route.  Each route can be registered once.
    pub fn add_route(
        &mut self,
        route: impl Into<String>,
        handler: impl MsgHandler + 'static,
    ) -> SdkResult<()> {
        let route = route.into();
        if self.routes.contains_key(&route) {
            return Err(SdkError::DuplicateRoute(route));
        }
        self.routes.insert(route, Box::new(handler));
        Ok(())
    }

    pub fn route(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, RouteError> {
        let handler = self
            .routes
            .get(&msg.route)
            .ok_or_else(|| RouteError::NoRoute(msg.route.clone()))?;

        trace!(route = %msg.route, kind = %msg.kind, "dispatching message");
        handler.handle(ctx, msg).map_err(|source| RouteError::Handler {
            route: msg.route.clone(),
            kind: msg.kind.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessel_store::{BackendKind, CacheView, StoreKey, StoreRegistry};

    use super::*;
    use crate::BlockHeader;

    struct Echo;

    impl MsgHandler for Echo {
        fn handle(&self, _ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, HandlerError> {
            if msg.kind == "fail" {
                return Err("asked to fail".into());
            }
            Ok(msg.kind.as_bytes().to_vec())
        }
    }

    fn msg(route: &str, kind: &str) -> Msg {
        Msg {
            route: route.to_owned(),
            kind: kind.to_owned(),
            signers: Vec::new(),
            value: json!(null),
        }
    }

    fn registry() -> StoreRegistry {
        let mut reg = StoreRegistry::open_temporary().unwrap();
        reg.mount(&StoreKey::new("main"), BackendKind::Merkle).unwrap();
        reg.load_latest().unwrap();
        reg
    }

    #[test]
    fn test_duplicate_route_fails() {
        let mut router = Router::new();
        router.add_route("echo", Echo).unwrap();
        assert!(matches!(
            router.add_route("echo", Echo),
            Err(SdkError::DuplicateRoute(r)) if r == "echo"
        ));
    }

    #[test]
    fn test_dispatch_and_no_route() {
        let mut router = Router::new();
        router.add_route("echo", Echo).unwrap();

        let reg = registry();
        let header = BlockHeader::default();
        let mut view = CacheView::new(&reg);
        let mut ctx = Context::new(&mut view, &header);

        assert_eq!(router.route(&mut ctx, &msg("echo", "hi")).unwrap(), b"hi");
        assert!(matches!(
            router.route(&mut ctx, &msg("bank", "send")),
            Err(RouteError::NoRoute(r)) if r == "bank"
        ));
        assert!(matches!(
            router.route(&mut ctx, &msg("echo", "fail")),
            Err(RouteError::Handler { .. })
        ));
    }
}
