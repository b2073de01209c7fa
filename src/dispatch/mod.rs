//! Request dispatch and exception handling.
//!
//! # Data Flow
//! ```text
//! Transport (one request)
//!     → dispatcher.rs (route lookup, 404 on miss)
//!     → route handler (RequestContext)
//!     → on Err(HandlerError):
//!         registry.rs (exact kind, then nearest ancestor kind)
//!         → exception handler, or generic 500
//! ```
//!
//! # Design Decisions
//! - Error kinds form an explicit parent tree (kind.rs) instead of type
//!   reflection; resolution is deterministic
//! - Failures inside exception handlers are logged and downgraded to the
//!   generic 500 carrying the original error's message
//! - Not-found never reaches the exception registry

pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod registry;

pub use dispatcher::{Dispatcher, Outcome};
pub use error::HandlerError;
pub use kind::ErrorKind;
pub use registry::{ExceptionHandler, ExceptionRegistry};
