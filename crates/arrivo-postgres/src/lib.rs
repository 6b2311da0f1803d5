//! PostgreSQL implementation of the arrival store.

mod arrival_repository;
mod client;

pub use arrival_repository::PostgresArrivalRepository;
pub use client::{PostgresClient, PostgresConfig};
