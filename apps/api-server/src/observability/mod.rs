//! Observability module - request correlation on top of the tracing spans.

mod request_id;

pub use request_id::RequestIdHeader;
