//! Error types for Forge Core

use thiserror::Error;

/// Result type alias using Forge's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Forge error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Required: {}", .0.join(" "))]
    MissingFields(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query compilation error: {0}")]
    QueryCompilation(String),

    #[error("Acceptable directions are \"to\" and \"from\", got \"{0}\"")]
    RelationshipDirection(String),

    #[error("Store error during {operation}: {message}")]
    Store { operation: String, message: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown navigation '{navigation}' on entity '{entity}'")]
    UnknownNavigation { entity: String, navigation: String },

    #[error("Invalid id range: {0}")]
    InvalidRange(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("{} of {total} batch operations failed", .failures.len())]
    Batch {
        total: usize,
        failures: Vec<(usize, Error)>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a store failure with the name of the operation that produced it
    pub fn store(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Store {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn compilation<T: Into<String>>(msg: T) -> Self {
        Error::QueryCompilation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Error::NotFound(msg.into())
    }

    /// Names of the missing fields if this is a validation failure
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            Error::MissingFields(fields) => Some(fields),
            _ => None,
        }
    }
}
