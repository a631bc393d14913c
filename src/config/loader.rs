//! Configuration loader for storefront-rs
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "STOREFRONT_CONFIG_DIR";

/// Environment variable for specific configuration file
pub const CONFIG_FILE_ENV: &str = "STOREFRONT_CONFIG_FILE";

/// Bare listening port variable, as set by most hosting platforms
pub const PORT_ENV: &str = "PORT";

/// Bare token signing secret variable
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "STOREFRONT";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml` (optional; built-in defaults fill every gap)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `STOREFRONT_*` environment variables
/// 5. `PORT` and `JWT_SECRET`
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, replaces the layered files with this single file
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if both `STOREFRONT_CONFIG_DIR` and
    /// `STOREFRONT_CONFIG_FILE` are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set. \
                 Use {CONFIG_DIR_ENV} for layered configuration or \
                 {CONFIG_FILE_ENV} for a single configuration file."
            )));
        }

        Ok(Self {
            config_dir: config_dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load a single configuration file instead of the layered directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Select which `{environment}.toml` layer is read.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load configuration from all sources and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - an explicitly selected configuration file does not exist
    /// - `PORT` is set but is not a port number
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            Self::add_file_source(builder, config_file, true)?
        } else {
            self.build_layered_config(builder)
        };

        // STOREFRONT_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);
        let builder = Self::add_bare_env_overrides(builder)?;

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> ConfigBuilder<DefaultState> {
        let layers = [
            "default.toml".to_string(),
            self.environment.config_file_name(),
            "local.toml".to_string(),
        ];

        layers.iter().fold(builder, |builder, name| {
            let path = self.config_dir.join(name);
            builder.add_source(Self::toml_file(&path).required(false))
        })
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(Self::toml_file(path).required(required)))
    }

    fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
        File::new(&path.to_string_lossy(), FileFormat::Toml)
    }

    /// Environment variables with prefix `STOREFRONT_` are mapped to
    /// configuration keys, `__` separating nested keys.
    ///
    /// Examples:
    /// - `STOREFRONT_SERVER__PORT` -> `server.port`
    /// - `STOREFRONT_AUTH__ALLOW_ADMIN_SIGNUP` -> `auth.allow_admin_signup`
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }

    /// `PORT` and `JWT_SECRET` win over every other source. Empty values are ignored.
    fn add_bare_env_overrides(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let port = match non_empty_var(PORT_ENV) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                ConfigError::env_var(format!("{PORT_ENV}='{raw}' is not a valid port number"))
            })?),
            None => None,
        };

        let builder = builder
            .set_override_option("server.port", port.map(i64::from))?
            .set_override_option("jwt.secret", non_empty_var(JWT_SECRET_ENV))?;
        Ok(builder)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}
