//! Route matching logic.
//!
//! # Responsibilities
//! - Find the route for a method and request path
//! - Extract the wildcard suffix for prefix routes
//!
//! # Design Decisions
//! - Exact routes always win over wildcard routes, whatever the registration order
//! - Among wildcard routes the first registered match wins; no specificity ranking
//! - Wildcards match by literal prefix, with no `/` boundary check:
//!   `/api/users/*` matches `/api/users99` with suffix `/99`

use axum::http::Method;

use crate::routing::route::{normalize_path, Route};
use crate::routing::table::RouteTable;

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    route: &'r Route,
    wildcard: Option<String>,
}

impl<'r> RouteMatch<'r> {
    pub fn route(&self) -> &'r Route {
        self.route
    }

    /// The captured suffix, or `None` when an exact route matched.
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    pub fn into_parts(self) -> (&'r Route, Option<String>) {
        (self.route, self.wildcard)
    }
}

impl RouteTable {
    /// Look up the route for `method` and `path`.
    ///
    /// `path` is normalized first, exactly as patterns are at registration.
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let routes = self.routes(method);
        if routes.is_empty() {
            return None;
        }

        let path = normalize_path(path);
        find_exact(routes, &path).or_else(|| find_wildcard(routes, &path))
    }
}

fn find_exact<'r>(routes: &'r [Route], path: &str) -> Option<RouteMatch<'r>> {
    routes
        .iter()
        .find(|route| !route.is_wildcard() && route.pattern() == path)
        .map(|route| RouteMatch {
            route,
            wildcard: None,
        })
}

fn find_wildcard<'r>(routes: &'r [Route], path: &str) -> Option<RouteMatch<'r>> {
    routes.iter().find_map(|route| {
        let prefix = route.prefix()?;
        let suffix = path.strip_prefix(prefix)?;
        Some(RouteMatch {
            route,
            wildcard: Some(wildcard_suffix(suffix)),
        })
    })
}

/// The remainder after the prefix, always starting with `/` unless empty.
fn wildcard_suffix(rest: &str) -> String {
    if rest.is_empty() || rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{rest}")
    }
}
