//! HTTP API module for the server, status, all and search endpoints.

pub mod handlers;
pub mod logging;
pub mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::{create_router, Endpoint, EndpointSet};
