//! Observability module - per-request context for tracing.

mod request_context;

pub use request_context::{REQUEST_ID_HEADER, RequestContext, RequestContextMiddleware};
