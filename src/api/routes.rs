//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::http::HeaderValue;
use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    error_envelope_middleware, logging_middleware, request_id_middleware, require_admin,
    require_auth,
};
use crate::config::{CorsConfig, ServerConfig};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID - generates or propagates `x-request-id`
/// 2. Logging - logs each request with its request ID
/// 3. CORS
/// 4. Error envelope - uniform JSON error bodies carrying the request ID
/// 5. Timeout - answers 408 when a handler exceeds `server.request_timeout`
///
/// # Routes
/// - `/api/auth` - Signup, login and the current user
/// - `/api/users` - User CRUD (admin)
/// - `/api/products` - Product catalogue (writes admin)
/// - `/health` - Health checks
/// - `/swagger-ui`, `/api-docs/openapi.json` - API documentation
pub fn create_router(state: AppState, server: &ServerConfig, cors: &CorsConfig) -> Router {
    let auth_routes = handlers::auth::auth_routes().merge(
        handlers::auth::me_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        )),
    );

    let user_routes = handlers::users::user_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/products", handlers::products::product_routes(&state))
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout)))
        .layer(middleware::from_fn(error_envelope_middleware))
        .layer(cors_layer(cors))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allows_any_origin() {
        return CorsLayer::permissive();
    }

    // Origins were checked by CorsConfig::validate; anything unparsable is skipped
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
