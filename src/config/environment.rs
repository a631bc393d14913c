//! Deployment environment, which picks the `{environment}.toml` layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Variable consulted by [`Environment::from_env`]
    pub const ENV_VAR: &'static str = "STOREFRONT_APP_ENV";

    const ALL: [Environment; 4] = [
        Environment::Development,
        Environment::Test,
        Environment::Staging,
        Environment::Production,
    ];

    /// Reads `STOREFRONT_APP_ENV`, falling back to `Development` when it is
    /// unset or unrecognised.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Name of the configuration layer for this environment, e.g. `staging.toml`
    pub fn config_file_name(&self) -> String {
        format!("{}.toml", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let alias = match value.as_str() {
            "dev" => Some(Environment::Development),
            "stage" => Some(Environment::Staging),
            "prod" => Some(Environment::Production),
            _ => None,
        };

        alias
            .or_else(|| Self::ALL.into_iter().find(|env| env.as_str() == value))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(Environment::as_str).collect();
                ConfigError::env_var(format!(
                    "Invalid {} '{}'. Valid values are: {}",
                    Self::ENV_VAR,
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
