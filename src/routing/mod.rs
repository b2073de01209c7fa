//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup:
//!     App::get / post / ... (method, pattern, handler)
//!     → table.rs (normalize, reject misplaced wildcard / duplicate)
//!     → Route appended to the method's ordered list
//!
//! Per request:
//!     (method, path)
//!     → matcher.rs (normalize, exact pass, then wildcard pass)
//!     → Return: RouteMatch { route, wildcard suffix } or None
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving (no locks)
//! - No regex, no parameters: exact paths and trailing `*` prefixes only
//! - Deterministic: same input always matches same route
//! - Explicit `None` for no match; the caller answers 404

pub mod matcher;
pub mod route;
pub mod table;

pub use matcher::RouteMatch;
pub use route::{normalize_path, Handler, Route, WILDCARD};
pub use table::{ConfigurationError, RouteTable};
