//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Configuration merger that handles CLI argument integration with file-based configuration
///
/// CLI arguments sit above every other source: files, `STOREFRONT_*`
/// variables and the bare `PORT`/`JWT_SECRET` variables.
#[derive(Debug)]
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Load the base configuration the way the CLI flags ask for it
    ///
    /// `--config` switches the loader to single-file mode and `--env`
    /// replaces `STOREFRONT_APP_ENV` when picking the environment layer.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = &cli.config {
            loader = loader.with_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        let environment = loader.environment();
        let config = loader.load()?;

        Ok(Self::new(config, environment))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Global `--verbose`/`--quiet` apply first; a command's `--log-level`
    /// then wins over both. The merged result is validated again since the
    /// overrides bypass the loader.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);

        if let Some(ref command) = cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                dry_run: _,
            } => {
                if let Some(host_addr) = host {
                    config.server.host = host_addr.clone();
                }

                if let Some(port_num) = port {
                    config.server.port = *port_num;
                }

                if let Some(level) = log_level {
                    config.logger.level = (*level).into();
                }
            }
        }
    }

    /// Get the base configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// Environment whose configuration layer was loaded
    pub fn environment(&self) -> Environment {
        self.environment
    }
}
