//! User CRUD request handlers.
//!
//! Every route here is admin-only; the gate is applied by the router.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{CreateUserRequest, ErrorResponse, UpdateUserRequest};
use crate::error::AppResult;
use crate::models::UserProfile;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates user-related routes.
///
/// Routes:
/// - GET /        - List all users
/// - POST /       - Create a new user
/// - GET /{id}    - Get user by ID
/// - PUT /{id}    - Update user by ID
/// - DELETE /{id} - Delete user by ID
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users, create_user))
        .routes(routes!(get_user, update_user, delete_user))
}

/// GET /api/users - List all users
#[utoipa::path(
    get,
    path = "/",
    tag = USER_TAG,
    responses(
        (status = 200, description = "All users without password hashes", body = Vec<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserProfile>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}

/// GET /api/users/{id} - Get user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = USER_TAG,
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let user = state.services.users.get_profile(&id).await?;
    Ok(Json(user))
}

/// POST /api/users - Create new user
///
/// Unlike signup, an admin may set the admin flag freely.
#[utoipa::path(
    post,
    path = "/",
    tag = USER_TAG,
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let user = state
        .services
        .users
        .create_user(payload.into_registration())
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users/{id} - Update user
///
/// Only the fields present in the body change.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = USER_TAG,
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .services
        .users
        .update_user(&id, payload.into_changes())
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id} - Delete user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = USER_TAG,
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.users.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
