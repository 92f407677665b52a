// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the fetch, mapping and storage layers.

/// Application error type.
///
/// Every failure a sync run can hit is one of these variants. Only the
/// top-level run handler decides which of them end the run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Whether this error ends a sync run.
    ///
    /// Transport and HTTP status failures are normally absorbed by the fetch
    /// loops and only cut a listing short.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_) | AppError::Validation(_) | AppError::Mapping(_) | AppError::Storage(_)
        )
    }

    /// Build a mapping error for a missing or mistyped field.
    pub fn missing_field(path: &str) -> Self {
        AppError::Mapping(format!("missing or invalid field `{}`", path))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::Auth("bad token".to_string()).is_fatal());
        assert!(AppError::Storage("disk full".to_string()).is_fatal());
        assert!(AppError::missing_field("map.id").is_fatal());
        assert!(!AppError::Transport("timed out".to_string()).is_fatal());
        assert!(!AppError::HttpStatus {
            status: 500,
            body: String::new()
        }
        .is_fatal());
    }

    #[test]
    fn test_missing_field_message() {
        let err = AppError::missing_field("athlete.id");
        assert_eq!(
            err.to_string(),
            "Mapping error: missing or invalid field `athlete.id`"
        );
    }
}
