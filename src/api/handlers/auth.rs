//! Authentication handlers for signup, login and the current principal.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{AuthResponse, ErrorResponse, LoginRequest, SignupRequest};
use crate::api::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserProfile};
use crate::services::UserRegistration;
use crate::state::AppState;
use crate::utils::jwt::issue_token;
use crate::utils::validate::ValidatedJson;

/// Creates the public authentication routes
///
/// # Routes
/// - `POST /signup` - Register and get a token
/// - `POST /login` - Authenticate and get a token
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(signup))
        .routes(routes!(login))
}

/// Creates the routes that need an authenticated principal
///
/// # Routes
/// - `GET /me` - Profile of the token holder
pub fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(me))
}

fn token_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = issue_token(
        &user.id,
        &state.jwt_config.secret,
        state.jwt_config.access_token_expiration,
    )?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// POST /api/auth/signup - Register new user
///
/// Creates an account and returns a token for it. Requesting the admin flag
/// is only honoured when admin signup is enabled in the configuration.
#[utoipa::path(
    post,
    path = "/signup",
    tag = AUTH_TAG,
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 403, description = "Admin signup is disabled", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    // Checked before the account is stored, so a signing failure leaves no user behind
    state.jwt_config.validate()?;

    if payload.is_admin && !state.auth_config.allow_admin_signup {
        tracing::warn!("Rejected signup requesting the admin flag");
        return Err(AppError::forbidden(
            "Admin accounts cannot be created through signup",
        ));
    }

    let user = state
        .services
        .users
        .create_user(UserRegistration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            is_admin: payload.is_admin,
        })
        .await?;

    let response = token_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Authenticate user
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    state.jwt_config.validate()?;

    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(token_response(&state, user)?))
}

/// GET /api/auth/me - Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Current user information", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Token subject no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.get_profile(&auth_user.user_id).await?;
    Ok(Json(profile))
}
