//! Error types for Neurika

use thiserror::Error;

/// Result type alias for Neurika operations
pub type Result<T> = std::result::Result<T, NeurikaError>;

/// Main error type for Neurika
#[derive(Error, Debug)]
pub enum NeurikaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown answer category: {0}")]
    InvalidCategory(String),

    #[error("Unknown team role: {0}")]
    InvalidRole(String),

    #[error("Unknown message role: {0}")]
    InvalidMessageRole(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
