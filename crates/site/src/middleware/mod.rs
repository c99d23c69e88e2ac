//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, no-store on the API)
//!
//! [`ClientIp`] is an extractor rather than a layer; only the contact route
//! needs it.

pub mod client_ip;
pub mod request_id;
pub mod security_headers;

pub use client_ip::{ClientIp, ip_from_headers};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
