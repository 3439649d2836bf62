//! HTTP API layer for tripcrew.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: groups, trips, activities, polls and votes
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: authentication, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
