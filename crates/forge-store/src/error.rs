//! Store error types

use forge_core::NodeId;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store-specific error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Missing query parameter: {0}")]
    MissingParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn query<T: Into<String>>(msg: T) -> Self {
        StoreError::Query(msg.into())
    }

    pub(crate) fn lock<E: std::fmt::Display>(e: E) -> Self {
        StoreError::Database(format!("Lock error: {}", e))
    }
}
