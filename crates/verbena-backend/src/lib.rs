//! Verbena Backend
//!
//! Client for the tool backend used by the editors: dynamic tool schemas,
//! remote validation, test runs, and node config saves.
//!
//! [`BackendClient`] issues plain requests. A [`ToolSession`] wraps one per open
//! editor and keeps at most one request in flight per operation, cancelling
//! the superseded one.

mod client;
mod error;
mod schema;
mod slot;

pub use client::{BackendClient, NodeSaver, TestOutcome};
pub use error::BackendError;
pub use schema::{FieldErrors, FieldSchema, SchemaType, ToolSchema};
pub use slot::{RequestSlot, SessionSaver, ToolSession};
