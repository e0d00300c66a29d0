//! Error types for the Synheart emotion SDK
//!
//! Inference never fails; these errors cover parsing, ingestion and schema
//! validation only.

use thiserror::Error;

use crate::schema::ValidationError;

/// Errors that can occur while reading or checking ingestion data
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Schema validation failed: {0}")]
    Validation(#[from] ValidationError),
}
