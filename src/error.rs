use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::validators::ValidationErrors;

/// Main error type for tank and reading operations
#[derive(Debug, Error)]
pub enum AquariumError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AquariumResult<T> = Result<T, AquariumError>;

/// Kind of record an operation addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Tank,
    Reading,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Tank => f.write_str("Tank"),
            Entity::Reading => f.write_str("Reading"),
        }
    }
}

/// Repository adapter errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt payload under key '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid collection key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl AquariumError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        AquariumError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AquariumError::Validation(_) => error_codes::VALIDATION_FAILED,
            AquariumError::NotFound {
                entity: Entity::Tank,
                ..
            } => error_codes::TANK_NOT_FOUND,
            AquariumError::NotFound {
                entity: Entity::Reading,
                ..
            } => error_codes::READING_NOT_FOUND,
            AquariumError::Storage(StorageError::Corrupt { .. }) => error_codes::CORRUPT_DATA,
            AquariumError::Storage(_) => error_codes::STORAGE_ERROR,
        }
    }

    /// Build the payload handed to the UI layer. Validation failures carry
    /// every human-readable message in `details`.
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            AquariumError::Validation(errors) => ErrorResponse::new(
                self.code(),
                "Please correct the highlighted values",
                errors.messages(),
            ),
            AquariumError::NotFound { entity, id } => ErrorResponse::new(
                self.code(),
                format!("{} {} no longer exists", entity, id),
                Vec::new(),
            ),
            AquariumError::Storage(_) => ErrorResponse::new(
                self.code(),
                "Saved data could not be read or written",
                Vec::new(),
            ),
        }
    }
}

/// Standard error payload
/// Contains stable machine-readable error code, human-readable message, and details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "VALIDATION_FAILED")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Individual messages, one per rejected field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Common error codes
pub mod error_codes {
    // Validation errors
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const OUT_OF_DOMAIN: &str = "OUT_OF_DOMAIN";
    pub const IMPLAUSIBLE_VALUE: &str = "IMPLAUSIBLE_VALUE";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const FIELD_TOO_LONG: &str = "FIELD_TOO_LONG";
    pub const INVALID_CHOICE: &str = "INVALID_CHOICE";

    // Not found errors
    pub const TANK_NOT_FOUND: &str = "TANK_NOT_FOUND";
    pub const READING_NOT_FOUND: &str = "READING_NOT_FOUND";

    // Storage errors
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const CORRUPT_DATA: &str = "CORRUPT_DATA";
}
