//! Fixed error responses.
//!
//! # Responsibilities
//! - Build the `{"error":"<message>"}` body used for 404 and generic 500
//! - Write the not-found response straight to the transport
//!
//! # Design Decisions
//! - Message escaping is done by `serde_json`, so quotes, backslashes and
//!   control characters always yield valid JSON

use std::io;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use serde_json::json;

use crate::http::transport::Transport;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

pub const NOT_FOUND_MESSAGE: &str = "Not Found";
/// Message used when an error carries none of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal Server Error";

/// `{"error":"<message>"}` with the message JSON-escaped.
pub fn error_body(message: &str) -> Vec<u8> {
    json!({ "error": message }).to_string().into_bytes()
}

/// 404 for requests no route matched.
pub fn send_not_found(transport: &mut dyn Transport) -> io::Result<()> {
    let headers = [(CONTENT_TYPE.as_str().to_string(), APPLICATION_JSON.to_string())];
    transport.write_response(StatusCode::NOT_FOUND, &headers, &error_body(NOT_FOUND_MESSAGE))
}
