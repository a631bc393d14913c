//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file that was explicitly requested does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A loaded value is outside its accepted range or format
    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    /// An environment variable is set but unusable
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    /// Error raised by the `config` crate while building sources
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn env_var(message: impl Into<String>) -> Self {
        ConfigError::EnvVarError(message.into())
    }

    pub fn mutual_exclusivity(message: impl Into<String>) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// Dotted key of the offending setting, when the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ConfigError::validation("jwt.secret", "JWT secret cannot be empty");
        assert_eq!(
            error.to_string(),
            "Validation error: jwt.secret - JWT secret cannot be empty"
        );
        assert_eq!(error.field(), Some("jwt.secret"));
    }

    #[test]
    fn test_non_validation_errors_have_no_field() {
        assert_eq!(ConfigError::env_var("PORT is not a number").field(), None);
        assert_eq!(ConfigError::file_not_found("config/app.toml").field(), None);
    }
}
