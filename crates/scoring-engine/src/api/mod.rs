//! HTTP API for the scoring engine

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::ScoringApiState;
pub use routes::{create_router, create_service_router};
