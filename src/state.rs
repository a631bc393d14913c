//! Application state for Axum web framework.
//!
//! Contains shared services and configuration that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::{AuthConfig, JwtConfig, Settings, StorageConfig};
use crate::repositories::Repositories;
use crate::services::Services;
use crate::utils::identity::{Clock, IdGenerator, SystemClock, UuidGenerator};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap; services share their stores through `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Token signing secret and lifetime
    pub jwt_config: JwtConfig,
    pub auth_config: AuthConfig,
    /// Where the collections live, reported by the health check
    pub storage_config: StorageConfig,
}

impl AppState {
    /// Creates the state with UUID v4 ids and the system clock.
    pub fn new(settings: &Settings) -> Self {
        Self::with_identity(settings, Arc::new(UuidGenerator), Arc::new(SystemClock))
    }

    /// Creates the state with explicit id and time sources.
    ///
    /// # Example
    /// ```ignore
    /// let state = AppState::with_identity(
    ///     &settings,
    ///     Arc::new(SequentialIdGenerator::new("id")),
    ///     Arc::new(SystemClock),
    /// );
    /// ```
    pub fn with_identity(
        settings: &Settings,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repos = Repositories::new(&settings.storage, ids, clock);
        Self {
            services: Services::new(repos),
            jwt_config: settings.jwt.clone(),
            auth_config: settings.auth.clone(),
            storage_config: settings.storage.clone(),
        }
    }
}
