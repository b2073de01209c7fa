//! The transport contract consumed by the dispatcher.
//!
//! # Responsibilities
//! - Expose the raw request line, headers and body of one request
//! - Accept exactly the one response the dispatcher decides on
//!
//! # Design Decisions
//! - Synchronous: handlers are plain functions, the async adapter
//!   (`http::server`) buffers the body up front and runs dispatch on the
//!   blocking pool
//! - Response headers are plain name/value pairs; adapters decide what to
//!   do with pairs their HTTP stack rejects

use std::io;

use axum::http::StatusCode;

/// One inbound request and its response channel.
pub trait Transport {
    /// Request method as received.
    fn method(&self) -> &str;

    /// Request path as received, without the query string.
    fn path(&self) -> &str;

    /// Raw query string, without the leading `?`.
    fn query(&self) -> Option<&str>;

    /// First value of the named request header, matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Read the whole request body. Called at most once per request.
    fn read_body(&mut self) -> io::Result<Vec<u8>>;

    /// Send status, headers and body.
    fn write_response(
        &mut self,
        status: StatusCode,
        headers: &[(String, String)],
        body: &[u8],
    ) -> io::Result<()>;

    /// The request is finished; release anything held for it.
    fn close(&mut self) {}
}

/// A response captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedResponse {
    /// First header with this name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// In-memory transport for exercising handlers and the dispatcher without
/// a socket.
///
/// ```
/// use switchyard::http::transport::{MemoryTransport, Transport};
///
/// let transport = MemoryTransport::new("GET", "/search?q=rust").with_header("Accept", "text/plain");
/// assert_eq!(transport.path(), "/search");
/// assert_eq!(transport.query(), Some("q=rust"));
/// assert_eq!(transport.header("accept"), Some("text/plain"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    fail_body: bool,
    fail_writes: bool,
    body_reads: usize,
    write_attempts: usize,
    response: Option<RecordedResponse>,
    closed: bool,
}

impl MemoryTransport {
    /// `target` is a path with an optional `?query`.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        Self {
            method: method.into(),
            path: path.to_string(),
            query,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Make body reads fail, as on a connection reset mid-upload.
    pub fn failing_body(mut self) -> Self {
        self.fail_body = true;
        self
    }

    /// Make every response write fail, as on a disconnected client.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// The response written, if any.
    pub fn response(&self) -> Option<&RecordedResponse> {
        self.response.as_ref()
    }

    pub fn body_reads(&self) -> usize {
        self.body_reads
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for MemoryTransport {
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
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn read_body(&mut self) -> io::Result<Vec<u8>> {
        self.body_reads += 1;
        if self.fail_body {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "request body unavailable",
            ));
        }
        Ok(std::mem::take(&mut self.body))
    }

    fn write_response(
        &mut self,
        status: StatusCode,
        headers: &[(String, String)],
        body: &[u8],
    ) -> io::Result<()> {
        self.write_attempts += 1;
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"));
        }
        if self.response.is_some() {
            return Err(io::Error::other("response already written"));
        }
        self.response = Some(RecordedResponse {
            status,
            headers: headers.to_vec(),
            body: body.to_vec(),
        });
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
