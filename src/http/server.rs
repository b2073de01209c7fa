//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router that feeds every request to the `Dispatcher`
//! - Wire up middleware (request ID, tracing, timeout)
//! - Adapt axum requests to the `Transport` contract (`AxumExchange`)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - The request body is buffered (up to `limits.max_body_bytes`) before
//!   dispatch; an oversized or broken body surfaces as a body read failure
//! - Dispatch runs on the blocking pool, so handlers may block freely
//! - A panicking handler costs its own request a 500, nothing more

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::http::query::decode_path;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::{error_body, APPLICATION_JSON, DEFAULT_ERROR_MESSAGE};
use crate::http::transport::Transport;

/// State injected into the fallback handler.
#[derive(Clone)]
struct ServerState {
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
}

/// HTTP server for a built `Dispatcher`.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, config: ServerConfig) -> Self {
        let state = ServerState {
            dispatcher,
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: ServerState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the dispatcher.
async fn dispatch_handler(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let id = request_id(request.headers()).to_string();
    let exchange = AxumExchange::from_request(request, state.max_body_bytes).await;

    let dispatcher = Arc::clone(&state.dispatcher);
    let dispatched = tokio::task::spawn_blocking(move || {
        let mut exchange = exchange;
        dispatcher.dispatch(&mut exchange);
        exchange
    })
    .await;

    match dispatched {
        Ok(exchange) => exchange.into_response(),
        Err(error) => {
            tracing::error!(request_id = %id, error = %error, "Dispatch task failed");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, APPLICATION_JSON)],
        error_body(DEFAULT_ERROR_MESSAGE),
    )
        .into_response()
}

/// A buffered axum request acting as the `Transport` for one dispatch.
pub struct AxumExchange {
    method: String,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Option<io::Result<Bytes>>,
    response: Option<Response>,
}

impl AxumExchange {
    /// Split `request` and buffer at most `max_body_bytes` of its body. The
    /// path is percent-decoded before routing.
    pub async fn from_request(request: Request<Body>, max_body_bytes: usize) -> Self {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(io::Error::other);

        Self {
            method: parts.method.as_str().to_string(),
            path: decode_path(parts.uri.path()),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body: Some(body),
            response: None,
        }
    }

    /// The response written by the dispatcher, or a generic 500 if none was.
    pub fn into_response(self) -> Response {
        match self.response {
            Some(response) => response,
            None => {
                tracing::error!(method = %self.method, path = %self.path, "Request finished without a response");
                internal_error()
            }
        }
    }
}

impl Transport for AxumExchange {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn read_body(&mut self) -> io::Result<Vec<u8>> {
        match self.body.take() {
            Some(body) => body.map(|bytes| bytes.to_vec()),
            None => Ok(Vec::new()),
        }
    }

    fn write_response(
        &mut self,
        status: StatusCode,
        headers: &[(String, String)],
        body: &[u8],
    ) -> io::Result<()> {
        if self.response.is_some() {
            return Err(io::Error::other("response already written"));
        }

        let mut response = Response::new(Body::from(body.to_vec()));
        *response.status_mut() = status;
        for (name, value) in headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        self.response = Some(response);
        Ok(())
    }
}
