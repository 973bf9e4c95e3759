//! API module
//!
//! HTTP routes, middleware, and credential utilities.

pub mod credentials;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
