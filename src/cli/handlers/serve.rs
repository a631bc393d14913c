//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use anyhow::Context;

use crate::config::{Environment, Settings};
use crate::server::Server;
use crate::state::AppState;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Arguments
    /// * `dry_run` - If true, validates configuration and exits without starting server
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Unreadable collection files
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only().await
        } else {
            Server::new(self.config, self.environment).run().await
        }
    }

    /// Validate configuration and open both collections without binding
    pub async fn validate_only(&self) -> anyhow::Result<()> {
        self.config
            .validate()
            .context("Configuration is invalid")?;

        println!("✓ Configuration is valid ({})", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());

        let state = AppState::new(&self.config);
        let (users, products) = tokio::try_join!(
            state.services.users.list_users(),
            state.services.products.list_products(),
        )
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| {
            format!(
                "Collections in '{}' could not be read",
                self.config.storage.data_dir
            )
        })?;

        println!(
            "✓ Data directory '{}' readable: {} users, {} products",
            self.config.storage.data_dir,
            users.len(),
            products.len()
        );
        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
