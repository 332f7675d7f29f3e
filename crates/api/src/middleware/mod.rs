//! HTTP middleware for the collections API.
//!
//! # Middleware Stack Order
//!
//! Layers are applied in reverse order (last added = first executed):
//! 1. Sentry (outermost, full request coverage)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the request span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
