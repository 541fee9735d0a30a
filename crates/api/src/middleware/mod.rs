//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS (SPA origins)
//! 5. Security headers
//! 6. Rate limiting on login and contact routes (governor)
//!
//! Authentication is not a layer: handlers opt in through the extractors
//! in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{CurrentCustomer, RequireAdmin, RequireAuth, RequireCustomer};
pub use rate_limit::{auth_rate_limiter, contact_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
