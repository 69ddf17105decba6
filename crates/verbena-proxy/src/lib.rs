//! Verbena Proxy
//!
//! Thin HTTP routes in front of the tool backend. Each route forwards the
//! caller's JSON body and query string to a fixed backend path and relays the
//! answer: the backend's body and status on success, `{ "error": detail }`
//! with the backend's status on a reported failure, and a generic 500 when
//! the backend cannot be reached or answers with something unreadable.

mod config;
mod error;
mod forward;
mod routes;
mod server;

pub use config::{DEFAULT_BACKEND_URL, DEFAULT_BIND, ProxyConfig};
pub use error::{INTERNAL_ERROR_MESSAGE, ProxyError};
pub use forward::{FALLBACK_DETAIL, ProxyState, failure_detail, relay};
pub use routes::router;
pub use server::{serve, serve_on};
