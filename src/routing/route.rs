//! Route definitions and path normalization.
//!
//! # Responsibilities
//! - Represent a registered (method, pattern) → handler binding
//! - Normalize paths the same way for registration and lookup
//!
//! # Design Decisions
//! - Routes are immutable once built; identity is `(method, pattern)`
//! - A pattern ending in `*` is a prefix match, nothing else is special

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::dispatch::HandlerError;
use crate::http::RequestContext;

/// Marker that turns a pattern into a prefix match.
pub const WILDCARD: char = '*';

/// Application callback invoked for a matched request.
pub trait Handler: Send + Sync + 'static {
    /// Handle one request. Returning an error hands it to the exception registry.
    fn handle(&self, ctx: &mut RequestContext<'_>) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut RequestContext<'_>) -> Result<(), HandlerError> {
        self(ctx)
    }
}

/// A registered route.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: String,
    prefix: Option<String>,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Build a route from an already normalized and validated pattern.
    pub(crate) fn new(method: Method, pattern: String, handler: Arc<dyn Handler>) -> Self {
        let prefix = pattern
            .strip_suffix(WILDCARD)
            .map(|stem| normalize_path(stem).into_owned());
        Self {
            method,
            pattern,
            prefix,
            handler,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The normalized pattern, including the trailing `*` for wildcard routes.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_wildcard(&self) -> bool {
        self.prefix.is_some()
    }

    /// The literal prefix a wildcard route matches against: the pattern
    /// without its `*`, normalized like any other path, so `/api/users/*`
    /// has prefix `/api/users`.
    ///
    /// Returns `None` for exact routes.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Normalize a path: ensure a leading `/` and strip a single trailing `/`
/// unless the result is the root path.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let trimmed = match path.strip_suffix('/') {
        Some(stem) if !stem.is_empty() => stem,
        _ => path,
    };

    if trimmed.starts_with('/') {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("/{trimmed}"))
    }
}
