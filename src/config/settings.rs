//! Configuration settings structures for storefront-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

/// Minimum accepted length of the token signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "storefront-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_products_file() -> String {
    "products.json".to_string()
}

fn default_access_token_expiration() -> i64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/storefront.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    ///
    /// IPv6 literals are bracketed so the result stays parseable.
    pub fn address(&self) -> String {
        if self.host.parse::<std::net::Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Location of the JSON collection files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every collection file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_users_file")]
    pub users_file: String,

    #[serde(default = "default_products_file")]
    pub products_file: String,
}

impl StorageConfig {
    /// Creates a storage configuration with the default file names under `data_dir`.
    pub fn in_dir(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.users_file)
    }

    pub fn products_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.products_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            products_file: default_products_file(),
        }
    }
}

// ============================================================================
// JWT Configuration
// ============================================================================

/// JWT authentication configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Supply it through `JWT_SECRET` or
    /// `STOREFRONT_JWT__SECRET` rather than a committed file.
    #[serde(default)]
    pub secret: String,

    /// Token lifetime in hours
    #[serde(default = "default_access_token_expiration")]
    pub access_token_expiration: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiration: default_access_token_expiration(),
        }
    }
}

impl JwtConfig {
    /// Validates the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty. Set JWT_SECRET or STOREFRONT_JWT__SECRET.",
            ));
        }

        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("JWT secret should be at least {MIN_JWT_SECRET_LEN} characters for security"),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Auth and CORS Configuration
// ============================================================================

/// Account policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Whether public signup may request the admin flag
    #[serde(default)]
    pub allow_admin_signup: bool,
}

/// Cross-origin policy. An empty list or `"*"` allows any origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`].
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl ConsoleSettings {
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::validation("logger.file", e.to_string()))
    }

    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub logger: LoggerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Arbitrary implementations for property-based testing
    // ========================================================================

    fn arb_application_config() -> impl Strategy<Value = ApplicationConfig> {
        ("[a-z][a-z0-9-]{0,20}", "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}")
            .prop_map(|(name, version)| ApplicationConfig { name, version })
    }

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
        )
            .prop_map(|(host, port, request_timeout)| ServerConfig {
                host,
                port,
                request_timeout,
            })
    }

    fn arb_storage_config() -> impl Strategy<Value = StorageConfig> {
        ("[a-z][a-z0-9_/]{0,20}", "[a-z]{1,10}\\.json", "[a-z]{1,10}\\.json").prop_map(
            |(data_dir, users_file, products_file)| StorageConfig {
                data_dir,
                users_file,
                products_file,
            },
        )
    }

    fn arb_jwt_config() -> impl Strategy<Value = JwtConfig> {
        ("[a-zA-Z0-9]{32,64}", 1i64..=720i64).prop_map(|(secret, access_token_expiration)| {
            JwtConfig {
                secret,
                access_token_expiration,
            }
        })
    }

    fn arb_cors_config() -> impl Strategy<Value = CorsConfig> {
        prop::collection::vec("https://[a-z]{1,10}\\.example", 0..3)
            .prop_map(|allowed_origins| CorsConfig { allowed_origins })
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            (any::<bool>(), any::<bool>()),
            (
                any::<bool>(),
                prop_oneof![
                    Just("logs/storefront.log".to_string()),
                    Just("/var/log/storefront.log".to_string()),
                ],
                any::<bool>(),
                prop_oneof![
                    Just("json".to_string()),
                    Just("full".to_string()),
                    Just("compact".to_string()),
                ],
            ),
        )
            .prop_map(
                |(level, (enabled, colored), (file_enabled, path, append, format))| {
                    LoggerSettings {
                        level,
                        console: ConsoleSettings { enabled, colored },
                        file: FileSettings {
                            enabled: file_enabled,
                            path,
                            append,
                            format,
                        },
                    }
                },
            )
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_application_config(),
            arb_server_config(),
            arb_storage_config(),
            arb_jwt_config(),
            any::<bool>(),
            arb_cors_config(),
            arb_logger_settings(),
        )
            .prop_map(
                |(application, server, storage, jwt, allow_admin_signup, cors, logger)| {
                    Settings {
                        application,
                        server,
                        storage,
                        jwt,
                        auth: AuthConfig { allow_admin_signup },
                        cors,
                        logger,
                    }
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any settings to TOML and reading them back is lossless.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");
            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");
            prop_assert_eq!(settings, deserialized);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.name, "storefront-rs");
        assert_eq!(config.version, crate::pkg_version());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_address_brackets_ipv6() {
        let config = ServerConfig {
            host: "::1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.address(), "[::1]:8080");
    }

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::default();
        assert_eq!(config.users_path(), PathBuf::from("data").join("users.json"));
        assert_eq!(
            config.products_path(),
            PathBuf::from("data").join("products.json")
        );

        let custom = StorageConfig::in_dir("/srv/shop");
        assert_eq!(custom.users_path(), PathBuf::from("/srv/shop/users.json"));
    }

    #[test]
    fn test_jwt_config_defaults() {
        let config = JwtConfig::default();
        assert!(config.secret.is_empty());
        assert_eq!(config.access_token_expiration, 24);
    }

    #[test]
    fn test_jwt_config_validate_empty_secret() {
        let error = JwtConfig::default().validate().unwrap_err();
        assert_eq!(error.field(), Some("jwt.secret"));
    }

    #[test]
    fn test_jwt_config_validate_short_secret() {
        let config = JwtConfig {
            secret: "short".to_string(),
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_jwt_config_validate_non_positive_expiration() {
        let config = JwtConfig {
            secret: "a".repeat(MIN_JWT_SECRET_LEN),
            access_token_expiration: 0,
        };
        let error = config.validate().unwrap_err();
        assert_eq!(error.field(), Some("jwt.access_token_expiration"));
    }

    #[test]
    fn test_jwt_config_validate_success() {
        let config = JwtConfig {
            secret: "a".repeat(MIN_JWT_SECRET_LEN),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_config_defaults_to_no_admin_signup() {
        assert!(!AuthConfig::default().allow_admin_signup);
    }

    #[test]
    fn test_cors_allows_any_origin() {
        assert!(CorsConfig::default().allows_any_origin());
        let wildcard = CorsConfig {
            allowed_origins: vec!["https://shop.example".to_string(), "*".to_string()],
        };
        assert!(wildcard.allows_any_origin());
        let listed = CorsConfig {
            allowed_origins: vec!["https://shop.example".to_string()],
        };
        assert!(!listed.allows_any_origin());
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
[server]
port = 8080

[jwt]
secret = "0123456789abcdef0123456789abcdef"

[auth]
allow_admin_signup = true
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.jwt.access_token_expiration, 24);
        assert!(settings.auth.allow_admin_signup);
        assert_eq!(settings.storage, StorageConfig::default());
        assert_eq!(settings.logger, LoggerSettings::default());
    }

    #[test]
    fn test_shipped_default_toml_matches_defaults() {
        let settings: Settings =
            toml::from_str(include_str!("../../config/default.toml")).unwrap();

        // Only the secret is left for the environment to supply
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: true,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                append: false,
                format: "compact".to_string(),
            },
        };

        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert_eq!(config.file.format, LogFormat::Compact);
        assert_eq!(config.file.path, PathBuf::from("logs/test.log"));
        assert!(!config.file.append);
    }

    #[test]
    fn test_file_settings_invalid_format() {
        let settings = FileSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        let error = settings.into_file_config().unwrap_err();
        assert_eq!(error.field(), Some("logger.file.format"));
    }

    #[test]
    fn test_logger_settings_both_outputs_disabled() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        let error = settings.into_logger_config().unwrap_err();
        assert_eq!(error.field(), Some("logger"));
    }
}
