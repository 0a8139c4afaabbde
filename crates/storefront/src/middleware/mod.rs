//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`, capture errors)
//! 2. Catch panic (turn handler panics into a 500)
//! 3. `TraceLayer` (request span with method, uri, status, latency)
//! 4. Request ID (record on the span, echo in the response)
//! 5. CORS (headers on every response, answers `OPTIONS`)
//! 6. Fault injection (random 500s and delays when enabled)

pub mod cors;
pub mod faults;
pub mod request_id;

pub use cors::{cors_layer, options_middleware};
pub use faults::fault_injection_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
