//! Per-request context handed to handlers.
//!
//! # Responsibilities
//! - Lazily parsed view of the request (query string, body)
//! - Pending response state (status, headers)
//! - Write-once response sink
//!
//! # Design Decisions
//! - Exactly one terminal write (`send_raw`, `send_text`, `send_json`)
//!   succeeds per context; the flag is ours, not the transport's
//! - A failed write still counts as the response: it is not retried and
//!   no fallback response follows it
//! - Body read failures yield an empty body instead of failing the request
//! - Lazy fields need no synchronization: a context belongs to one request

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::http::json::{JsonError, JsonProvider};
use crate::http::query::parse_query;
use crate::http::response::{error_body, APPLICATION_JSON, TEXT_PLAIN_UTF_8};
use crate::http::transport::Transport;

/// Errors raised by context operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A terminal write was attempted after the response was sent.
    #[error("response already sent")]
    AlreadySent,

    /// The transport failed while writing the response.
    #[error("failed to send response: {0}")]
    Transport(#[source] io::Error),

    /// The JSON provider failed.
    #[error(transparent)]
    Json(#[from] JsonError),
}

/// Request data and response sink for one request.
pub struct RequestContext<'t> {
    transport: &'t mut dyn Transport,
    json: Arc<dyn JsonProvider>,
    wildcard: Option<String>,
    query: OnceCell<HashMap<String, String>>,
    body: Option<String>,
    status: StatusCode,
    headers: Vec<(String, String)>,
    response_sent: bool,
}

impl<'t> RequestContext<'t> {
    pub fn new(
        transport: &'t mut dyn Transport,
        wildcard: Option<String>,
        json: Arc<dyn JsonProvider>,
    ) -> Self {
        Self {
            transport,
            json,
            wildcard,
            query: OnceCell::new(),
            body: None,
            status: StatusCode::OK,
            headers: Vec::new(),
            response_sent: false,
        }
    }

    pub fn method(&self) -> &str {
        self.transport.method()
    }

    /// The path exactly as received, before normalization.
    pub fn path(&self) -> &str {
        self.transport.path()
    }

    /// The suffix captured by a wildcard route; `None` for exact routes.
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    // query parameters

    pub fn query_params(&self) -> &HashMap<String, String> {
        self.query
            .get_or_init(|| self.transport.query().map(parse_query).unwrap_or_default())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params().get(name).map(String::as_str)
    }

    pub fn query_param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.query_param(name).unwrap_or(default)
    }

    // headers

    /// First value of a request header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.transport.header(name)
    }

    /// Set a response header, replacing any earlier value for the name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.set_header(CONTENT_TYPE.as_str(), content_type)
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// The status the next terminal write will send.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Pending response headers.
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    // body

    /// The request body as UTF-8 text, read on first call and cached.
    ///
    /// Invalid UTF-8 is replaced; a failed read yields an empty string.
    pub fn string_body(&mut self) -> &str {
        let transport = &mut *self.transport;
        self.body.get_or_insert_with(|| read_body_text(transport))
    }

    /// Decode the body through the JSON provider.
    pub fn body_as<T: DeserializeOwned>(&mut self) -> Result<T, ContextError> {
        let json = Arc::clone(&self.json);
        let value = json.decode(self.string_body())?;
        serde_json::from_value(value).map_err(|err| JsonError::decode(err).into())
    }

    // responses

    /// Send `body` as-is with the pending status and headers.
    pub fn send_raw(&mut self, body: impl AsRef<[u8]>) -> Result<(), ContextError> {
        self.ensure_not_sent()?;
        self.commit(self.status, body.as_ref())
    }

    /// Send `text` as `text/plain; charset=utf-8`.
    pub fn send_text(&mut self, text: impl AsRef<str>) -> Result<(), ContextError> {
        self.ensure_not_sent()?;
        self.set_content_type(TEXT_PLAIN_UTF_8);
        self.commit(self.status, text.as_ref().as_bytes())
    }

    /// Encode `value` through the JSON provider and send it as `application/json`.
    pub fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ContextError> {
        self.ensure_not_sent()?;
        let value = serde_json::to_value(value).map_err(JsonError::encode)?;
        let encoded = self.json.encode(&value)?;
        self.set_content_type(APPLICATION_JSON);
        self.commit(self.status, encoded.as_bytes())
    }

    pub fn is_response_sent(&self) -> bool {
        self.response_sent
    }

    /// 204 with the pending headers and no body.
    pub(crate) fn send_no_content(&mut self) -> Result<(), ContextError> {
        self.ensure_not_sent()?;
        self.commit(StatusCode::NO_CONTENT, &[])
    }

    /// `{"error":"<message>"}` with `status`.
    pub(crate) fn send_error(&mut self, status: StatusCode, message: &str) -> Result<(), ContextError> {
        self.ensure_not_sent()?;
        self.set_content_type(APPLICATION_JSON);
        self.commit(status, &error_body(message))
    }

    fn ensure_not_sent(&self) -> Result<(), ContextError> {
        if self.response_sent {
            return Err(ContextError::AlreadySent);
        }
        Ok(())
    }

    fn commit(&mut self, status: StatusCode, body: &[u8]) -> Result<(), ContextError> {
        self.response_sent = true;
        self.transport
            .write_response(status, &self.headers, body)
            .map_err(ContextError::Transport)
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method())
            .field("path", &self.path())
            .field("wildcard", &self.wildcard)
            .field("status", &self.status)
            .field("response_sent", &self.response_sent)
            .finish_non_exhaustive()
    }
}

fn read_body_text(transport: &mut dyn Transport) -> String {
    match transport.read_body() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            tracing::warn!(error = %error, "Failed to read request body, treating it as empty");
            String::new()
        }
    }
}
