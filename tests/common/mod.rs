//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use switchyard::config::ServerConfig;
use switchyard::dispatch::{kind, ErrorKind, HandlerError};
use switchyard::http::MemoryTransport;
use switchyard::lifecycle::Shutdown;
use switchyard::{App, Dispatcher};

/// Application error kind used to exercise ancestor resolution.
pub static VALIDATION: ErrorKind = ErrorKind::child("validation", &kind::INVALID_ARGUMENT);

/// An app with the routes most tests need.
pub fn sample_app() -> App {
    let mut app = App::new();
    app.get("/users", |ctx| Ok(ctx.send_text("all users")?))
        .unwrap()
        .get("/users/*", |ctx| {
            let rest = ctx.wildcard().unwrap_or_default().to_string();
            Ok(ctx.send_text(format!("user:{rest}"))?)
        })
        .unwrap()
        .get("/search", |ctx| {
            let q = ctx.query_param_or("q", "none").to_string();
            Ok(ctx.send_json(&json!({ "q": q }))?)
        })
        .unwrap()
        .post("/users", |ctx| {
            let user: serde_json::Value = ctx.body_as()?;
            ctx.set_status(StatusCode::CREATED);
            Ok(ctx.send_json(&user)?)
        })
        .unwrap()
        .delete("/users/*", |_| Ok(()))
        .unwrap()
        .get("/fail", |_| Err(HandlerError::new(&VALIDATION, "name is required")))
        .unwrap()
        .get("/crash", |_| Err(HandlerError::new(&kind::ILLEGAL_STATE, "state corrupted")))
        .unwrap();

    app.exception(&kind::INVALID_ARGUMENT, |ctx, error| {
        ctx.set_status(StatusCode::BAD_REQUEST);
        Ok(ctx.send_json(&json!({ "invalid": error.to_string() }))?)
    });
    app
}

pub fn sample_dispatcher() -> Dispatcher {
    sample_app().build()
}

/// Dispatch one in-memory request.
pub fn run(dispatcher: &Dispatcher, transport: MemoryTransport) -> MemoryTransport {
    let mut transport = transport;
    dispatcher.dispatch(&mut transport);
    transport
}

/// A served app on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        result.expect("server returned an error");
    }
}

/// Serve `app` on `127.0.0.1:0`.
pub async fn spawn_server(app: App, config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();

    let handle = tokio::spawn(app.serve(config, listener, receiver));
    TestServer {
        addr,
        shutdown,
        handle,
    }
}
