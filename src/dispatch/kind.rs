//! Error kinds and their "is-a" hierarchy.
//!
//! Kinds are `static` nodes that name their parent, forming a tree rooted at
//! [`ERROR`]. Applications declare their own kinds the same way:
//!
//! ```
//! use switchyard::dispatch::{kind, ErrorKind};
//!
//! static NOT_AUTHORIZED: ErrorKind = ErrorKind::child("not_authorized", &kind::ERROR);
//! static TOKEN_EXPIRED: ErrorKind = ErrorKind::child("token_expired", &NOT_AUTHORIZED);
//!
//! assert!(TOKEN_EXPIRED.is_a(&kind::ERROR));
//! ```
//!
//! Kinds are identified by name, so names must be unique within a process.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A node in the error-kind tree.
#[derive(Debug)]
pub struct ErrorKind {
    name: &'static str,
    parent: Option<&'static ErrorKind>,
}

impl ErrorKind {
    /// A kind with no parent.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A kind that "is-a" `parent`.
    pub const fn child(name: &'static str, parent: &'static ErrorKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static ErrorKind> {
        self.parent
    }

    /// This kind followed by each ancestor up to the root, nearest first.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static ErrorKind> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }

    /// True when `other` is this kind or one of its ancestors.
    pub fn is_a(&'static self, other: &ErrorKind) -> bool {
        self.ancestors().any(|kind| kind == other)
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Root of every error kind.
pub static ERROR: ErrorKind = ErrorKind::root("error");

/// The request was malformed or a handler rejected its input.
pub static INVALID_ARGUMENT: ErrorKind = ErrorKind::child("invalid_argument", &ERROR);

/// An operation was attempted in the wrong state.
pub static ILLEGAL_STATE: ErrorKind = ErrorKind::child("illegal_state", &ERROR);

/// A second terminal write was attempted on one request.
pub static ALREADY_SENT: ErrorKind = ErrorKind::child("already_sent", &ILLEGAL_STATE);

/// Writing the response through the transport failed.
pub static TRANSPORT: ErrorKind = ErrorKind::child("transport", &ERROR);

/// The JSON provider failed to encode or decode.
pub static JSON: ErrorKind = ErrorKind::child("json", &ERROR);
