//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the route for one transport-delivered request (or answer 404)
//! - Run the handler against a fresh `RequestContext`
//! - Send 204 when a handler succeeds without writing
//! - Route handler errors through the exception registry, falling back to
//!   a generic 500
//!
//! # Outcomes
//! ```text
//! no route                          → RouteNotFound  404 {"error":"Not Found"}
//! handler Ok, nothing written       → NoContent      204
//! handler Ok, response written      → Responded      as written
//! handler Err, exception handler wrote → Recovered   as written
//! handler Err, no handler / no write   → Unrecovered 500 generic
//! handler Err, exception handler Err   → HandlerFailed 500 generic (original message)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};

use crate::dispatch::error::HandlerError;
use crate::dispatch::registry::ExceptionRegistry;
use crate::http::json::JsonProvider;
use crate::http::response::{self, DEFAULT_ERROR_MESSAGE};
use crate::http::{RequestContext, Transport};
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Terminal state of one dispatched request. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// No route matched; 404 sent.
    RouteNotFound,
    /// Handler succeeded without writing; 204 sent.
    NoContent,
    /// Handler succeeded and wrote its own response.
    Responded,
    /// Handler failed and an exception handler wrote the response.
    Recovered,
    /// Handler failed and nothing recovered it; generic 500 sent.
    Unrecovered,
    /// Handler failed and so did its exception handler; generic 500 sent.
    HandlerFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::RouteNotFound => "route_not_found",
            Outcome::NoContent => "no_content",
            Outcome::Responded => "responded",
            Outcome::Recovered => "recovered",
            Outcome::Unrecovered => "unrecovered",
            Outcome::HandlerFailed => "handler_failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen routing and error-handling configuration, shared by all requests.
pub struct Dispatcher {
    routes: RouteTable,
    exceptions: ExceptionRegistry,
    json: Arc<dyn JsonProvider>,
}

impl Dispatcher {
    pub fn new(
        routes: RouteTable,
        exceptions: ExceptionRegistry,
        json: Arc<dyn JsonProvider>,
    ) -> Self {
        Self {
            routes,
            exceptions,
            json,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Handle one request end to end and close the transport.
    pub fn dispatch(&self, transport: &mut dyn Transport) -> Outcome {
        let start = Instant::now();
        let method = transport.method().to_ascii_uppercase();

        let outcome = self.dispatch_inner(&method, transport);
        transport.close();

        tracing::debug!(
            method = %method,
            path = %transport.path(),
            outcome = %outcome,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Request dispatched"
        );
        metrics::record_request(&method, outcome, start);
        outcome
    }

    fn dispatch_inner(&self, method: &str, transport: &mut dyn Transport) -> Outcome {
        let route_match = Method::from_bytes(method.as_bytes())
            .ok()
            .and_then(|method| self.routes.find(&method, transport.path()));

        let Some(route_match) = route_match else {
            if let Err(error) = response::send_not_found(transport) {
                tracing::warn!(error = %error, "Failed to send not-found response");
            }
            return Outcome::RouteNotFound;
        };

        let (route, wildcard) = route_match.into_parts();
        let mut ctx = RequestContext::new(transport, wildcard, Arc::clone(&self.json));

        match route.handler().handle(&mut ctx) {
            Ok(()) if ctx.is_response_sent() => Outcome::Responded,
            Ok(()) => match ctx.send_no_content() {
                Ok(()) => Outcome::NoContent,
                Err(error) => self.handle_error(&mut ctx, error.into()),
            },
            Err(error) => self.handle_error(&mut ctx, error),
        }
    }

    fn handle_error(&self, ctx: &mut RequestContext<'_>, error: HandlerError) -> Outcome {
        let Some((registered, handler)) = self.exceptions.resolve(error.kind()) else {
            tracing::warn!(kind = %error.kind(), error = %error, "Unhandled handler error");
            send_generic_error(ctx, &error);
            return Outcome::Unrecovered;
        };

        tracing::debug!(kind = %error.kind(), handler = %registered, "Dispatching to exception handler");

        match handler.handle(ctx, &error) {
            Ok(()) if ctx.is_response_sent() => Outcome::Recovered,
            Ok(()) => {
                send_generic_error(ctx, &error);
                Outcome::Unrecovered
            }
            Err(handler_error) => {
                tracing::error!(
                    kind = %error.kind(),
                    error = %error,
                    handler_error = %handler_error,
                    "Exception handler failed"
                );
                send_generic_error(ctx, &error);
                Outcome::HandlerFailed
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.len())
            .field("exceptions", &self.exceptions)
            .finish_non_exhaustive()
    }
}

/// 500 with the error's own message. Skipped when the request already has a
/// response: the first write stands.
fn send_generic_error(ctx: &mut RequestContext<'_>, error: &HandlerError) {
    if ctx.is_response_sent() {
        tracing::debug!(error = %error, "Response already committed, dropping generic error response");
        return;
    }

    let message = error.message().unwrap_or(DEFAULT_ERROR_MESSAGE);
    if let Err(write_error) = ctx.send_error(StatusCode::INTERNAL_SERVER_ERROR, message) {
        tracing::warn!(error = %write_error, "Failed to send error response");
    }
}
