//! # Router
//!
//! Radix-trie based route matching using `matchit`. Registration happens
//! once at startup; matching is read-only and lock-free after that.
//!
//! Path parameters are extracted as raw strings (`/users/{id}` matching
//! `/users/7` yields `id = "7"`); any typing or coercion belongs to the
//! params schema downstream.

use crate::contract::Method;
use crate::error::{Error, Result};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;

/// Identifier joining a matched route to its bound handler entry
pub type HandlerId = usize;

/// Matched route with raw path parameters
#[derive(Debug)]
pub struct RouteMatch {
    /// The handler ID for this route
    pub handler_id: HandlerId,
    /// Raw string parameters extracted from the path
    pub params: HashMap<String, String>,
}

/// Per-method route tables
#[derive(Clone, Default)]
pub struct Router {
    method_routes: HashMap<Method, MatchitRouter<HandlerId>>,
    next_handler_id: HandlerId,
}

impl Router {
    /// Create a new empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with the given method and path template
    ///
    /// Handler ids are assigned densely in registration order; the caller
    /// keeps its side table indexed the same way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoutePattern`] if the template is malformed
    /// or conflicts with an existing route.
    pub fn add_route(&mut self, method: Method, path: &str) -> Result<HandlerId> {
        let handler_id = self.next_handler_id;
        self.next_handler_id += 1;

        self.method_routes
            .entry(method)
            .or_insert_with(MatchitRouter::new)
            .insert(path, handler_id)
            .map_err(|e| Error::InvalidRoutePattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(handler_id)
    }

    /// Match a request path against the registered routes
    ///
    /// `None` means no route matched; the dispatch layer turns that into
    /// its not-found response.
    #[must_use]
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let router = self.method_routes.get(&method)?;
        let matched = router.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some(RouteMatch {
            handler_id: *matched.value,
            params,
        })
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.next_handler_id
    }

    /// Whether no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_handler_id == 0
    }
}
