use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::repositories::StoreError;

/// A single field-level validation failure reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

/// Application-wide error type that represents all possible errors in the system.
///
/// Client-facing variants (validation, not found, auth) carry the information
/// needed to build a helpful response. Server-side variants keep their source
/// error for logging only; it is never echoed back to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Duplicate entry error for unique key violations
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several field validation failures collected from a request body
    #[error("Validation failed for {} field(s)", errors.len())]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Unauthorized access error with authentication message
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Forbidden access error with authorization message
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Record store failure (read, parse or write of a collection file)
    #[error("Storage operation failed: {operation}")]
    Storage {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &str, field: &str, value: impl Into<String>) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Shorthand for a `Duplicate` error.
    pub fn duplicate(entity: &str, field: &str, value: impl Into<String>) -> Self {
        AppError::Duplicate {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Shorthand for an `Unauthorized` error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    /// Shorthand for a `Forbidden` error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::Storage {
            operation: error.operation().to_string(),
            source: error.into(),
        }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = match &error {
            crate::config::error::ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: error.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| ValidationFieldError {
                    field: field.to_string(),
                    message: failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", failure.code)),
                })
            })
            .collect();
        // HashMap iteration order is unstable
        collected.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors: collected }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validation_errors_are_collected_and_sorted() {
        let payload = Payload {
            name: String::new(),
            email: "not-an-email".to_string(),
        };
        let error = AppError::from(payload.validate().unwrap_err());

        match error {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "email");
                assert!(errors[0].message.contains("email"));
                assert_eq!(errors[1].field, "name");
                assert_eq!(errors[1].message, "Name is required");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_store_error_becomes_storage_error() {
        let error = AppError::from(StoreError::MissingCollection {
            path: "data/users.json".into(),
            collection: "users",
        });
        match error {
            AppError::Storage { operation, .. } => assert_eq!(operation, "load collection"),
            other => panic!("Expected Storage error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = AppError::not_found("product", "id", "42");
        assert_eq!(error.to_string(), "Resource not found: product with id=42");
    }
}
