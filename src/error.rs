//! Error types for input handling at the crate boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Unknown path quality: {0}")]
    UnknownQuality(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
