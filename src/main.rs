//! Switchyard demo server.
//!
//! Loads configuration, wires logging and metrics, registers a handful of
//! demo routes and serves them until SIGINT/SIGTERM.

use std::path::PathBuf;

use axum::http::StatusCode;
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use switchyard::config::{self, ServerConfig};
use switchyard::dispatch::kind;
use switchyard::http::SerdeJsonProvider;
use switchyard::lifecycle::{wait_for_signal, Shutdown};
use switchyard::observability::{init_logging, init_metrics};
use switchyard::{App, HandlerError};

#[derive(Debug, Parser)]
#[command(name = "switchyard", version, about = "HTTP routing and dispatch demo server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "switchyard starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let app = demo_app(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.trigger();
        }
    });

    app.serve(config, listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn demo_app(config: &ServerConfig) -> Result<App, switchyard::routing::ConfigurationError> {
    let mut app = App::new();
    app.json_provider(SerdeJsonProvider::new(config.json.pretty));

    app.get("/", |ctx| Ok(ctx.send_text("switchyard")?))?
        .get("/health", |ctx| Ok(ctx.send_json(&json!({ "status": "ok" }))?))?
        .get("/hello", |ctx| {
            let greeting = format!("Hello, {}!", ctx.query_param_or("name", "world"));
            Ok(ctx.send_text(greeting)?)
        })?
        .get("/echo/*", |ctx| {
            let rest = ctx.wildcard().unwrap_or_default().to_string();
            Ok(ctx.send_text(rest)?)
        })?
        .post("/echo", |ctx| {
            let body: Value = ctx
                .body_as()
                .map_err(|err| HandlerError::invalid_argument("body must be JSON").with_source(err))?;
            Ok(ctx.send_json(&body)?)
        })?;

    app.exception(&kind::INVALID_ARGUMENT, |ctx, error| {
        ctx.set_status(StatusCode::BAD_REQUEST);
        Ok(ctx.send_json(&json!({ "error": error.to_string() }))?)
    });

    Ok(app)
}
