//! Route registration.
//!
//! # Responsibilities
//! - Store routes per method in registration order
//! - Reject duplicate `(method, pattern)` pairs
//! - Reject patterns with a `*` anywhere but the last character
//!
//! # Design Decisions
//! - Registration takes `&mut self`: the table is built during setup and
//!   frozen into a `Dispatcher` before any request is served
//! - Configuration errors are returned, never logged and skipped

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::HandlerError;
use crate::http::RequestContext;
use crate::routing::route::{normalize_path, Handler, Route, WILDCARD};

/// Errors raised while building the route table. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The pattern contains `*` somewhere other than its last character.
    #[error("wildcard must terminate the path: {pattern}")]
    MisplacedWildcard { pattern: String },

    /// The same method and normalized pattern were registered twice.
    #[error("duplicate route: {method} {pattern}")]
    DuplicateRoute { method: Method, pattern: String },
}

/// Routes grouped by method, each group in registration order.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
    keys: HashSet<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure or function as the handler for `method` and `pattern`.
    pub fn register<F>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&Route, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register_handler(method, pattern, Arc::new(handler))
    }

    /// Register a shared handler object.
    pub fn register_handler(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<&Route, ConfigurationError> {
        let pattern = normalize_path(pattern).into_owned();

        if let Some(position) = pattern.find(WILDCARD) {
            if position != pattern.len() - WILDCARD.len_utf8() {
                return Err(ConfigurationError::MisplacedWildcard { pattern });
            }
        }

        let key = format!("{method}:{pattern}");
        if self.keys.contains(&key) {
            return Err(ConfigurationError::DuplicateRoute { method, pattern });
        }
        self.keys.insert(key);

        tracing::debug!(method = %method, pattern = %pattern, "Route registered");

        let routes = self.routes.entry(method.clone()).or_default();
        routes.push(Route::new(method, pattern, handler));
        Ok(&routes[routes.len() - 1])
    }

    /// Routes registered for `method`, in registration order.
    pub fn routes(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
