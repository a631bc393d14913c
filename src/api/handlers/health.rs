//! Health check endpoint handlers.
//!
//! The storage check reads both collections through the services, which
//! proves the data directory is reachable and every file parses.

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Service and storage health
/// - `GET /health/live` - Liveness check
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(liveness_check))
}

/// Basic health check endpoint.
///
/// # Responses
/// - `200 OK` - Service is healthy
/// - `503 Service Unavailable` - A collection could not be read
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = check_storage(&state).await;
    let status = storage.status;

    let mut checks = HashMap::new();
    checks.insert("storage".to_string(), storage);

    let response = HealthResponse {
        status,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now().to_string(),
        checks,
    };

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

/// Liveness check endpoint.
///
/// Does not touch storage; if the process can answer, it is alive.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_storage(state: &AppState) -> ComponentHealth {
    let start_time = Instant::now();

    let result = tokio::try_join!(
        state.services.users.list_users(),
        state.services.products.list_products(),
    );
    let response_time_ms = Some(start_time.elapsed().as_millis() as u64);

    match result {
        Ok(_) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Collections readable".to_string()),
            response_time_ms,
        },
        Err(e) => {
            tracing::error!(
                error = ?e,
                data_dir = %state.storage_config.data_dir,
                "Storage health check failed"
            );
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Collections unreadable".to_string()),
                response_time_ms,
            }
        }
    }
}
