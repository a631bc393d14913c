//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, Settings};
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    /// Only reported at startup; the configuration layers are already applied
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Start the server and run until shutdown signal
    ///
    /// Both collections are loaded once before binding, so a corrupt data
    /// file stops startup instead of failing the first request.
    ///
    /// # Errors
    /// - Invalid JWT configuration
    /// - Unreadable collection files
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        tracing::info!(
            data_dir = %self.settings.storage.data_dir,
            users_file = %self.settings.storage.users_file,
            products_file = %self.settings.storage.products_file,
            "Storage configuration loaded"
        );

        tracing::info!(
            access_token_expiration = %self.settings.jwt.access_token_expiration,
            secret_configured = %(!self.settings.jwt.secret.is_empty()),
            allow_admin_signup = %self.settings.auth.allow_admin_signup,
            "Auth configuration loaded"
        );

        self.settings.jwt.validate().map_err(|e| {
            tracing::error!(error = %e, "JWT configuration validation failed");
            anyhow::anyhow!("JWT configuration validation failed: {}", e)
        })?;

        let state = AppState::new(&self.settings);
        let (users, products) = tokio::try_join!(
            state.services.users.list_users(),
            state.services.products.list_products(),
        )
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to open collections");
            anyhow::anyhow!("Failed to open collections in '{}': {}", self.settings.storage.data_dir, e)
        })?;
        tracing::info!(
            users = users.len(),
            products = products.len(),
            "Collections opened"
        );

        let router = create_router(state, &self.settings.server, &self.settings.cors);

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// If a handler cannot be installed the failure is logged and that signal
/// is ignored; the other one still triggers shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
