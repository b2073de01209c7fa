//! Switchyard: HTTP routing and dispatch.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ AxumExchange (Transport)
//!                                          │
//!                                          ▼
//!                                   dispatch::Dispatcher
//!                                    │             │
//!                          routing::RouteTable     │ handler Err
//!                          (exact, then wildcard)  ▼
//!                                    │      dispatch::ExceptionRegistry
//!                                    ▼      (kind, then ancestors)
//!                            http::RequestContext
//!                            (lazy query/body, write-once response)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```
//!
//! Everything below `http::server` is synchronous and driven through the
//! [`http::Transport`] trait, so the dispatcher can be exercised without a
//! socket via [`http::MemoryTransport`].

// Core subsystems
pub mod app;
pub mod dispatch;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

/// Boxed error used as the source of handler and JSON errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use app::App;
pub use config::ServerConfig;
pub use dispatch::{Dispatcher, ErrorKind, HandlerError, Outcome};
pub use http::{RequestContext, Transport};
pub use lifecycle::Shutdown;
