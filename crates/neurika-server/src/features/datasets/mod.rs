//! Uploaded datasets: upload, list, inspect, profile and delete

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::datasets_routes;
pub use types::{DatasetFormat, DatasetRecord};
