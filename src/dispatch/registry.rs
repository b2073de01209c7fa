//! Exception handler registry.
//!
//! # Responsibilities
//! - Map error kinds to recovery handlers
//! - Resolve the handler for an error by walking its kind's ancestry
//!
//! # Design Decisions
//! - One handler per kind; registering again replaces the previous handler
//!   (unlike routes, which reject duplicates)
//! - Nearest registered ancestor wins, so resolution never depends on
//!   registration or map iteration order

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::error::HandlerError;
use crate::dispatch::kind::ErrorKind;
use crate::http::RequestContext;

/// Recovery callback for errors of a given kind.
pub trait ExceptionHandler: Send + Sync + 'static {
    /// Handle `error`, normally by sending a response through `ctx`.
    fn handle(&self, ctx: &mut RequestContext<'_>, error: &HandlerError) -> Result<(), HandlerError>;
}

impl<F> ExceptionHandler for F
where
    F: Fn(&mut RequestContext<'_>, &HandlerError) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut RequestContext<'_>, error: &HandlerError) -> Result<(), HandlerError> {
        self(ctx, error)
    }
}

/// Error kind → handler.
#[derive(Default, Clone)]
pub struct ExceptionRegistry {
    handlers: HashMap<&'static str, Arc<dyn ExceptionHandler>>,
}

impl ExceptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure or function for `kind` and all its descendants
    /// that have no closer handler.
    pub fn register<F>(&mut self, kind: &'static ErrorKind, handler: F)
    where
        F: Fn(&mut RequestContext<'_>, &HandlerError) -> Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.register_handler(kind, Arc::new(handler));
    }

    pub fn register_handler(&mut self, kind: &'static ErrorKind, handler: Arc<dyn ExceptionHandler>) {
        if self.handlers.insert(kind.name(), handler).is_some() {
            tracing::debug!(kind = %kind, "Exception handler replaced");
        } else {
            tracing::debug!(kind = %kind, "Exception handler registered");
        }
    }

    /// Find the handler for `kind`: an exact registration first, then the
    /// nearest registered ancestor. Returns the kind the handler was
    /// registered under alongside it.
    pub fn resolve(
        &self,
        kind: &'static ErrorKind,
    ) -> Option<(&'static ErrorKind, &dyn ExceptionHandler)> {
        kind.ancestors().find_map(|candidate| {
            self.handlers
                .get(candidate.name())
                .map(|handler| (candidate, handler.as_ref()))
        })
    }

    pub fn contains(&self, kind: &ErrorKind) -> bool {
        self.handlers.contains_key(kind.name())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ExceptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("ExceptionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::kind::{ALREADY_SENT, ERROR, ILLEGAL_STATE, TRANSPORT};

    static BASE: ErrorKind = ErrorKind::child("registry_base", &ERROR);
    static MIDDLE: ErrorKind = ErrorKind::child("registry_middle", &BASE);
    static LEAF: ErrorKind = ErrorKind::child("registry_leaf", &MIDDLE);

    fn recover(_: &mut RequestContext<'_>, _: &HandlerError) -> Result<(), HandlerError> {
        Ok(())
    }

    fn resolved(registry: &ExceptionRegistry, kind: &'static ErrorKind) -> Option<&'static str> {
        registry.resolve(kind).map(|(kind, _)| kind.name())
    }

    #[test]
    fn exact_kind_preferred() {
        let mut registry = ExceptionRegistry::new();
        registry.register(&BASE, recover);
        registry.register(&LEAF, recover);
        assert_eq!(resolved(&registry, &LEAF), Some("registry_leaf"));
    }

    #[test]
    fn nearest_ancestor_wins() {
        let mut registry = ExceptionRegistry::new();
        registry.register(&ERROR, recover);
        registry.register(&MIDDLE, recover);
        registry.register(&BASE, recover);
        assert_eq!(resolved(&registry, &LEAF), Some("registry_middle"));
        assert_eq!(resolved(&registry, &BASE), Some("registry_base"));
        assert_eq!(resolved(&registry, &TRANSPORT), Some("error"));
    }

    #[test]
    fn unrelated_kinds_do_not_resolve() {
        let mut registry = ExceptionRegistry::new();
        registry.register(&ILLEGAL_STATE, recover);
        assert_eq!(resolved(&registry, &ALREADY_SENT), Some("illegal_state"));
        assert_eq!(resolved(&registry, &TRANSPORT), None);
        assert_eq!(resolved(&registry, &LEAF), None);
    }

    #[test]
    fn reregistering_overwrites() {
        let mut registry = ExceptionRegistry::new();
        registry.register(&BASE, recover);
        registry.register(&BASE, |_: &mut RequestContext<'_>, _: &HandlerError| Ok(()));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&BASE));
    }
}
