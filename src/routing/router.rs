//! Route table and lookup.
//!
//! # Responsibilities
//! - Store (method, pattern, handler) entries
//! - Look up the first entry matching a request method and target
//! - Return the matched route with its extracted path match, or explicit no-match
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared via Arc, no locks)
//! - O(n) scan in declaration order; first match wins
//! - Method and pattern must both match; a known path with the wrong method is a no-match

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::http::{ApiResult, RouteRequest};
use crate::routing::matcher::{PathMatch, PathPattern};

/// A route handler. Handlers close over whatever state they need.
pub type Handler = Arc<dyn Fn(RouteRequest) -> ApiResult + Send + Sync>;

/// A single route entry.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The template the route was declared with, e.g. `/tasks/:id`.
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Invoke the handler.
    pub fn handle(&self, request: RouteRequest) -> ApiResult {
        (self.handler)(request)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template())
            .finish_non_exhaustive()
    }
}

/// A route matched against a request.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub path_match: PathMatch,
}

/// Ordered, immutable list of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    ///
    /// # Panics
    /// Panics if `template` is malformed (see [`PathPattern::new`]).
    pub fn route<F>(mut self, method: Method, template: &str, handler: F) -> Self
    where
        F: Fn(RouteRequest) -> ApiResult + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::new(template),
            handler: Arc::new(handler),
        });
        self
    }

    /// Find the first route matching `method` and `target` (path plus optional query).
    pub fn match_request(&self, method: &Method, target: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route
                    .pattern
                    .matches(target)
                    .map(|path_match| RouteMatch { route, path_match })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}
