//! Configuration validation logic
//!
//! Every section gets a `validate` method; [`Settings::validate`] runs them
//! all at startup and returns the first failure.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ApplicationConfig, CorsConfig, FileSettings, LoggerSettings, ServerConfig, Settings,
    StorageConfig,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ApplicationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation(
                "application.name",
                "Application name cannot be empty.",
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Host must not be empty
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Server host cannot be empty.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Validate storage configuration
    ///
    /// # Validation Rules
    /// - Data directory and both file names must be non-empty
    /// - File names must be bare names, not paths
    /// - Users and products must live in different files
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::validation(
                "storage.data_dir",
                "Data directory cannot be empty.",
            ));
        }

        for (field, name) in [
            ("storage.users_file", &self.users_file),
            ("storage.products_file", &self.products_file),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::validation(field, "File name cannot be empty."));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(ConfigError::validation(
                    field,
                    format!("'{name}' must be a file name inside storage.data_dir, not a path."),
                ));
            }
        }

        if self.users_file == self.products_file {
            return Err(ConfigError::validation(
                "storage.products_file",
                "Users and products cannot share a collection file.",
            ));
        }

        Ok(())
    }
}

impl CorsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = self
            .allowed_origins
            .iter()
            .find(|o| o.as_str() != "*" && axum::http::HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::validation(
                "cors.allowed_origins",
                format!("'{origin}' is not a valid origin header value."),
            ));
        }
        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// A level is either one of the plain levels or a full filter directive
    /// containing `=`, which is checked when the subscriber is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if !level.contains('=') && !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.application.validate()?;
        self.server.validate()?;
        self.storage.validate()?;
        self.jwt.validate()?;
        self.cors.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
