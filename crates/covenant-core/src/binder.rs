//! # Route Binder
//!
//! Mechanical composition, no decision logic: look the route up in the
//! contract, register its method and path template with the router, and
//! file the descriptor next to the handler so the validation pipeline can
//! retrieve it at dispatch time.
//!
//! A route name missing from the contract is a configuration defect and
//! fails here, at registration time; it can never surface per-request.

use crate::contract::{Contract, Method, RouteDescriptor};
use crate::error::{Error, Result};
use crate::interceptor::Handler;
use crate::server::Server;
use std::sync::Arc;

/// Handler side-table entry: the descriptor travels with its handler
///
/// Indexed by the handler id the router assigned, which is also the
/// insertion order.
#[derive(Clone)]
pub(crate) struct BoundRoute {
    pub(crate) descriptor: Option<Arc<RouteDescriptor>>,
    pub(crate) handler: Handler,
}

impl Server {
    /// Bind `handler` to a named contract route
    ///
    /// Registers the descriptor's method and path template and attaches
    /// the descriptor for the validation pipeline.
    ///
    /// # Errors
    ///
    /// [`Error::RouteNotInContract`] when the contract does not declare
    /// `route_name`; [`Error::InvalidRoutePattern`] when the descriptor's
    /// path template cannot be registered.
    pub fn bind_contract(
        &mut self,
        contract: &Contract,
        route_name: &str,
        handler: Handler,
    ) -> Result<()> {
        let route = contract
            .route(route_name)
            .ok_or_else(|| Error::RouteNotInContract {
                contract: contract.name().to_string(),
                route: route_name.to_string(),
            })?;

        let handler_id = self.router.add_route(route.method, &route.path_template)?;
        debug_assert_eq!(handler_id, self.routes.len());
        self.routes.push(BoundRoute {
            descriptor: Some(route),
            handler,
        });
        Ok(())
    }

    /// Register a route without a contract
    ///
    /// The request passes through the pipeline unvalidated and the
    /// handler's value is emitted without an envelope.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRoutePattern`] when the path cannot be registered.
    pub fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<()> {
        let handler_id = self.router.add_route(method, path)?;
        debug_assert_eq!(handler_id, self.routes.len());
        self.routes.push(BoundRoute {
            descriptor: None,
            handler,
        });
        Ok(())
    }
}
