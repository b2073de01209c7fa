//! Application setup surface.
//!
//! # Responsibilities
//! - Collect routes and exception handlers during setup
//! - Freeze them into a shareable `Dispatcher`
//! - Serve the result over HTTP
//!
//! # Data Flow
//! ```text
//! App::get/post/... → RouteTable (duplicate + wildcard checks)
//! App::exception    → ExceptionRegistry
//! App::build        → Dispatcher (read-only, shared across requests)
//! App::serve        → HttpServer → Dispatcher per request
//! ```

use std::io;
use std::sync::Arc;

use axum::http::Method;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, ErrorKind, ExceptionRegistry, HandlerError};
use crate::http::{HttpServer, JsonProvider, RequestContext, SerdeJsonProvider};
use crate::routing::{ConfigurationError, RouteTable};

/// Builder for routes, exception handlers and the JSON provider.
///
/// ```
/// use switchyard::App;
///
/// let mut app = App::new();
/// app.get("/hello", |ctx| Ok(ctx.send_text("hi")?))?
///    .get("/files/*", |ctx| {
///        let rest = ctx.wildcard().unwrap_or_default().to_string();
///        Ok(ctx.send_text(rest)?)
///    })?;
/// let dispatcher = app.build();
/// assert_eq!(dispatcher.routes().len(), 2);
/// # Ok::<(), switchyard::routing::ConfigurationError>(())
/// ```
pub struct App {
    routes: RouteTable,
    exceptions: ExceptionRegistry,
    json: Arc<dyn JsonProvider>,
}

impl App {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            exceptions: ExceptionRegistry::new(),
            json: Arc::new(SerdeJsonProvider::default()),
        }
    }

    /// Register `handler` for `method` and `pattern`.
    pub fn route<F>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.routes.register(method, pattern, handler)?;
        Ok(self)
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn(&mut RequestContext<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Handle errors of `kind` and its descendants. Replaces any handler
    /// already registered for `kind`.
    pub fn exception<F>(&mut self, kind: &'static ErrorKind, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext<'_>, &HandlerError) -> Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.exceptions.register(kind, handler);
        self
    }

    pub fn json_provider(&mut self, provider: impl JsonProvider) -> &mut Self {
        self.json = Arc::new(provider);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Freeze the configuration.
    pub fn build(self) -> Dispatcher {
        tracing::debug!(
            routes = self.routes.len(),
            exception_handlers = self.exceptions.len(),
            "Dispatcher built"
        );
        Dispatcher::new(self.routes, self.exceptions, self.json)
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn serve(
        self,
        config: ServerConfig,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        let server = HttpServer::new(Arc::new(self.build()), config);
        server.run(listener, shutdown).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
