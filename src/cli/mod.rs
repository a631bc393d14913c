//! CLI module for storefront-rs
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution and validation
//! - Command handlers for the serve operation

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context;

use crate::config::{Environment as AppEnvironment, Settings};
use crate::logger::init_logger;

/// Load and merge configuration from CLI arguments
///
/// This function handles the complete configuration loading process:
/// 1. Load base configuration from files and environment variables
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
///
/// # Returns
/// Merged and validated Settings together with the environment that was loaded
///
/// # Errors
/// Returns error if configuration loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<(Settings, AppEnvironment)> {
    let merger = ConfigurationMerger::from_cli(cli).context("Configuration error")?;

    let settings = merger
        .merge_cli_args(cli)
        .context("Configuration merge error")?;

    Ok((settings, merger.environment()))
}

/// Initialize logger from settings
///
/// # Errors
/// Returns error if the logger settings are invalid or a global subscriber
/// is already installed
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
