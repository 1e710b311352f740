//! Cross-cutting HTTP middleware
//!
//! Authentication middleware lives in `auth::middleware`, next to the
//! state machine it adapts; this module holds the generic layers.

pub mod security_headers;

pub use security_headers::security_headers_middleware;
