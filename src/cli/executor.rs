//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::ServeCommandHandler;
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};

/// Execute a CLI command with the given settings
///
/// Running without a subcommand behaves like a plain `serve`.
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
/// * `environment` - Environment whose configuration layer was loaded
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            warn_on_privileged_port(&settings);
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
    }
}

fn warn_on_privileged_port(settings: &Settings) {
    if settings.server.port < 1024 {
        tracing::warn!(
            port = settings.server.port,
            "Binding to a port below 1024 usually requires elevated privileges"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, StorageConfig};
    use clap::Parser;
    use tempfile::TempDir;

    fn create_valid_config(dir: &TempDir) -> Settings {
        Settings {
            storage: StorageConfig::in_dir(dir.path().to_string_lossy()),
            jwt: JwtConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["storefront-rs", "serve", "--dry-run"]).unwrap();

        let result = execute_command(&cli, create_valid_config(&dir), Environment::Test).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_execute_serve_dry_run_reports_bad_data() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("products.json"), "not json").unwrap();
        let cli = Cli::try_parse_from(["storefront-rs", "serve", "--dry-run"]).unwrap();

        let result = execute_command(&cli, create_valid_config(&dir), Environment::Test).await;
        assert!(result.is_err());
    }
}
