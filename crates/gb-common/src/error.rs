//! Error types for Grid Bayes.

use thiserror::Error;

/// Result type alias for Grid Bayes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Grid Bayes.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid network parameters: {0}")]
    InvalidParams(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    // Network construction errors (20-29)
    #[error("network construction failed: {0}")]
    Build(String),

    #[error("value {value} is outside the domain of {variable}")]
    DomainMismatch { variable: String, value: String },

    // Inference errors (30-39)
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("missing parent {parent} while conditioning {variable}")]
    Conditioning { variable: String, parent: String },

    // Path search errors (40-49)
    #[error("path search failed: {0}")]
    PathSearch(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParams(_) => 11,
            Error::SchemaValidation(_) => 12,
            Error::Build(_) => 20,
            Error::DomainMismatch { .. } => 21,
            Error::Inference(_) => 30,
            Error::Conditioning { .. } => 31,
            Error::PathSearch(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
