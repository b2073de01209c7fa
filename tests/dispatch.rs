//! Dispatcher behavior through the in-memory transport.

use axum::http::{Method, StatusCode};
use serde_json::Value;

use switchyard::dispatch::{kind, HandlerError, Outcome};
use switchyard::http::{ContextError, MemoryTransport};
use switchyard::routing::{ConfigurationError, RouteTable};
use switchyard::App;

mod common;

use common::{run, sample_dispatcher};

fn json_body(transport: &MemoryTransport) -> Value {
    serde_json::from_slice(&transport.response().unwrap().body).unwrap()
}

#[test]
fn test_duplicate_registration_fails() {
    let mut table = RouteTable::new();
    table.register(Method::GET, "/users", |_| Ok(())).unwrap();

    let err = table.register(Method::GET, "/users", |_| Ok(())).unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateRoute { .. }));

    // Same pattern under another method is fine.
    table.register(Method::POST, "/users", |_| Ok(())).unwrap();
}

#[test]
fn test_misplaced_wildcard_fails() {
    let mut table = RouteTable::new();
    for pattern in ["/a/*/b", "*/x", "/a**"] {
        let err = table.register(Method::GET, pattern, |_| Ok(())).unwrap_err();
        assert!(
            matches!(err, ConfigurationError::MisplacedWildcard { .. }),
            "{pattern}"
        );
    }
    assert!(table.is_empty());
}

#[test]
fn test_trailing_slash_normalization() {
    let dispatcher = sample_dispatcher();
    let transport = run(&dispatcher, MemoryTransport::new("GET", "/users/"));
    assert_eq!(transport.response().unwrap().body_text(), "all users");

    let mut app = App::new();
    app.get("/", |ctx| Ok(ctx.send_text("root")?)).unwrap();
    let dispatcher = app.build();
    let transport = run(&dispatcher, MemoryTransport::new("GET", "/"));
    assert_eq!(transport.response().unwrap().body_text(), "root");
}

#[test]
fn test_exact_beats_wildcard_regardless_of_order() {
    let mut app = App::new();
    app.get("/api/*", |ctx| Ok(ctx.send_text("wildcard")?))
        .unwrap()
        .get("/api/status", |ctx| Ok(ctx.send_text("exact")?))
        .unwrap();
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/api/status"));
    assert_eq!(transport.response().unwrap().body_text(), "exact");

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/api/other"));
    assert_eq!(transport.response().unwrap().body_text(), "wildcard");
}

#[test]
fn test_wildcard_suffix_extraction() {
    let dispatcher = sample_dispatcher();

    let cases = [
        ("/users/42", "user:/42"),
        ("/users/42/posts", "user:/42/posts"),
    ];
    for (path, expected) in cases {
        let transport = run(&dispatcher, MemoryTransport::new("GET", path));
        assert_eq!(transport.response().unwrap().body_text(), expected, "{path}");
    }

    // The bare prefix hits the exact route when one exists...
    let transport = run(&dispatcher, MemoryTransport::new("GET", "/users"));
    assert_eq!(transport.response().unwrap().body_text(), "all users");

    // ...and the wildcard with an empty suffix when it does not.
    let mut app = App::new();
    app.get("/files/*", |ctx| {
        let rest = ctx.wildcard().map(str::to_string);
        Ok(ctx.send_text(format!("{rest:?}"))?)
    })
    .unwrap();
    let dispatcher = app.build();
    let transport = run(&dispatcher, MemoryTransport::new("GET", "/files"));
    assert_eq!(transport.response().unwrap().body_text(), r#"Some("")"#);
    let transport = run(&dispatcher, MemoryTransport::new("GET", "/files/99"));
    assert_eq!(transport.response().unwrap().body_text(), r#"Some("/99")"#);
}

#[test]
fn test_query_parameters() {
    let mut app = App::new();
    app.get("/q", |ctx| {
        let params = ctx.query_params();
        let mut keys: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        keys.sort();
        Ok(ctx.send_text(keys.join(";"))?)
    })
    .unwrap();
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/q?a=1&b=&c"));
    assert_eq!(transport.response().unwrap().body_text(), "a=1;b=");

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/q?name=J%C3%BCrgen+M"));
    assert_eq!(transport.response().unwrap().body_text(), "name=Jürgen M");
}

#[test]
fn test_query_default_value() {
    let dispatcher = sample_dispatcher();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/search"));
    assert_eq!(json_body(&transport)["q"], "none");

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/search?q=rust"));
    assert_eq!(json_body(&transport)["q"], "rust");
}

#[test]
fn test_second_write_fails_and_first_is_sent() {
    let mut app = App::new();
    app.get("/twice", |ctx| {
        ctx.send_text("first")?;
        match ctx.send_text("second") {
            Err(ContextError::AlreadySent) => Ok(()),
            other => panic!("expected AlreadySent, got {other:?}"),
        }
    })
    .unwrap();
    let dispatcher = app.build();

    let mut transport = MemoryTransport::new("GET", "/twice");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::Responded);
    assert_eq!(transport.write_attempts(), 1);
    assert_eq!(transport.response().unwrap().body_text(), "first");
}

#[test]
fn test_propagated_second_write_keeps_first_response() {
    let mut app = App::new();
    app.get("/twice", |ctx| {
        ctx.send_text("first")?;
        ctx.send_text("second")?;
        Ok(())
    })
    .unwrap();
    let dispatcher = app.build();

    let mut transport = MemoryTransport::new("GET", "/twice");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::Unrecovered);
    assert_eq!(transport.write_attempts(), 1);
    assert_eq!(transport.response().unwrap().body_text(), "first");
}

#[test]
fn test_unmatched_path_is_404() {
    let dispatcher = sample_dispatcher();
    let mut transport = MemoryTransport::new("GET", "/nowhere");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::RouteNotFound);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.body_text(), r#"{"error":"Not Found"}"#);
}

#[test]
fn test_unregistered_method_is_404() {
    let dispatcher = sample_dispatcher();
    let transport = run(&dispatcher, MemoryTransport::new("PUT", "/users"));

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body_text(), r#"{"error":"Not Found"}"#);
}

#[test]
fn test_no_write_sends_204() {
    let dispatcher = sample_dispatcher();
    let mut transport = MemoryTransport::new("DELETE", "/users/7");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::NoContent);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());
    assert!(transport.is_closed());
}

#[test]
fn test_json_body_round_trip() {
    let dispatcher = sample_dispatcher();
    let transport = run(
        &dispatcher,
        MemoryTransport::new("POST", "/users")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"name":"ada"}"#),
    );

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(json_body(&transport)["name"], "ada");
}

#[test]
fn test_malformed_json_body_is_unrecovered_500() {
    let dispatcher = sample_dispatcher();
    let mut transport = MemoryTransport::new("POST", "/users").with_body("{nope");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::Unrecovered);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&transport)["error"]
        .as_str()
        .unwrap()
        .starts_with("failed to decode JSON"));
}

#[test]
fn test_subtype_error_dispatches_to_ancestor_handler() {
    let dispatcher = sample_dispatcher();
    let mut transport = MemoryTransport::new("GET", "/fail");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::Recovered);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&transport)["invalid"], "name is required");
}

#[test]
fn test_nearest_registered_ancestor_wins() {
    let mut app = App::new();
    app.get("/fail", |_| Err(HandlerError::new(&common::VALIDATION, "x")))
        .unwrap();
    app.exception(&kind::ERROR, |ctx, _| Ok(ctx.send_text("root")?));
    app.exception(&kind::INVALID_ARGUMENT, |ctx, _| Ok(ctx.send_text("parent")?));
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/fail"));
    assert_eq!(transport.response().unwrap().body_text(), "parent");
}

#[test]
fn test_unhandled_error_is_generic_500() {
    let dispatcher = sample_dispatcher();
    let mut transport = MemoryTransport::new("GET", "/crash");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::Unrecovered);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_text(), r#"{"error":"state corrupted"}"#);
}

#[test]
fn test_error_without_message_uses_default() {
    let mut app = App::new();
    app.get("/bare", |_| Err(HandlerError::from_kind(&kind::ERROR)))
        .unwrap();
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/bare"));
    assert_eq!(
        transport.response().unwrap().body_text(),
        r#"{"error":"Internal Server Error"}"#
    );
}

#[test]
fn test_failing_exception_handler_yields_original_message() {
    let mut app = App::new();
    app.get("/fail", |_| Err(HandlerError::invalid_argument("original problem")))
        .unwrap();
    app.exception(&kind::INVALID_ARGUMENT, |_, _| {
        Err(HandlerError::new(&kind::ERROR, "handler blew up"))
    });
    let dispatcher = app.build();

    let mut transport = MemoryTransport::new("GET", "/fail");
    assert_eq!(dispatcher.dispatch(&mut transport), Outcome::HandlerFailed);

    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_text(), r#"{"error":"original problem"}"#);
}

#[test]
fn test_body_read_failure_reads_as_empty() {
    let mut app = App::new();
    app.post("/len", |ctx| {
        let len = ctx.string_body().len();
        Ok(ctx.send_text(len.to_string())?)
    })
    .unwrap();
    let dispatcher = app.build();

    let transport = run(
        &dispatcher,
        MemoryTransport::new("POST", "/len").with_body("abc").failing_body(),
    );
    assert_eq!(transport.response().unwrap().body_text(), "0");
    assert_eq!(transport.body_reads(), 1);
}

#[test]
fn test_response_headers_and_status_are_sent() {
    let mut app = App::new();
    app.get("/teapot", |ctx| {
        ctx.set_status(StatusCode::IM_A_TEAPOT)
            .set_header("X-Brew", "earl grey")
            .set_header("x-brew", "assam");
        Ok(ctx.send_raw(b"short and stout")?)
    })
    .unwrap();
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/teapot"));
    let response = transport.response().unwrap();
    assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(response.header("X-Brew"), Some("assam"));
    assert_eq!(response.headers.len(), 1);
    assert_eq!(response.body_text(), "short and stout");
}

#[test]
fn test_json_fields_keep_declaration_order() {
    #[derive(serde::Serialize)]
    struct Order {
        quantity: u32,
        item: &'static str,
        at: &'static str,
    }

    let mut app = App::new();
    app.get("/order", |ctx| {
        Ok(ctx.send_json(&Order {
            quantity: 2,
            item: "tea",
            at: "noon",
        })?)
    })
    .unwrap();
    let dispatcher = app.build();

    let transport = run(&dispatcher, MemoryTransport::new("GET", "/order"));
    assert_eq!(
        transport.response().unwrap().body_text(),
        r#"{"quantity":2,"item":"tea","at":"noon"}"#
    );
}
