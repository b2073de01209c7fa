//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → AxumExchange (buffered request, implements transport.rs)
//!     → Dispatcher (blocking pool)
//!     → context.rs (query.rs / json.rs on demand, write-once response)
//!     → response.rs (fixed error bodies)
//!     → Send to client
//! ```

pub mod context;
pub mod json;
pub mod query;
pub mod request;
pub mod response;
pub mod server;
pub mod transport;

pub use context::{ContextError, RequestContext};
pub use json::{JsonError, JsonProvider, SerdeJsonProvider};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AxumExchange, HttpServer};
pub use transport::{MemoryTransport, RecordedResponse, Transport};
