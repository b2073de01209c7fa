//! Application-level handler errors.

use std::error::Error as StdError;
use std::fmt;

use crate::dispatch::kind::{self, ErrorKind};
use crate::http::ContextError;
use crate::BoxError;

/// An error returned by a route handler.
///
/// Carries the [`ErrorKind`] used to pick an exception handler, an optional
/// message used in the generic error response, and an optional source.
#[derive(Debug)]
pub struct HandlerError {
    kind: &'static ErrorKind,
    message: Option<String>,
    source: Option<BoxError>,
}

impl HandlerError {
    pub fn new(kind: &'static ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            source: None,
        }
    }

    /// An error with no message. Generic error responses fall back to
    /// `Internal Server Error`.
    pub fn from_kind(kind: &'static ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Shorthand for an [`kind::INVALID_ARGUMENT`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(&kind::INVALID_ARGUMENT, message)
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> &'static ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// True when this error's kind is `kind` or descends from it.
    pub fn is(&self, kind: &ErrorKind) -> bool {
        self.kind.is_a(kind)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => write!(f, "{} error", self.kind),
        }
    }
}

impl StdError for HandlerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

impl From<ContextError> for HandlerError {
    fn from(err: ContextError) -> Self {
        let kind = match &err {
            ContextError::AlreadySent => &kind::ALREADY_SENT,
            ContextError::Transport(_) => &kind::TRANSPORT,
            ContextError::Json(_) => &kind::JSON,
        };
        Self::new(kind, err.to_string()).with_source(err)
    }
}
