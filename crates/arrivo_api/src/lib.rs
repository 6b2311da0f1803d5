//! HTTP surface for the arrival pipeline.
//!
//! Handles JSON ↔ domain mapping and error conversion; all business rules
//! live in arrivo-domain.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{arrivo_router, ApiState};
pub use server::{run_http_server, CorsConfig, HttpServerConfig};
