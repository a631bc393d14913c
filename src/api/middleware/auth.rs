//! Bearer authentication and admin authorization middleware.
//!
//! `require_auth` resolves the principal from a JWT; `require_admin`
//! runs after it and re-reads the user record to check the admin flag.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::{Claims, verify_token};

/// Authenticated principal, stored in request extensions.
///
/// Extract it in handlers with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User ID from the token subject
    pub user_id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` value.
fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// JWT authentication middleware
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing, not a bearer token,
/// or the token fails verification.
///
/// # Example
/// ```ignore
/// OpenApiRouter::new()
///     .routes(routes!(handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    let token = bearer_token(auth_header).ok_or_else(|| {
        AppError::unauthorized("Invalid authorization header format. Expected: Bearer <token>")
    })?;

    let claims = verify_token(token, &state.jwt_config.secret).inspect_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Admin authorization middleware
///
/// Must be layered inside `require_auth`. The user record is loaded on
/// every request, so revoking the flag takes effect immediately.
///
/// # Errors
/// - 401 if no principal was attached
/// - 403 if the user no longer exists or is not an admin
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    state
        .services
        .users
        .ensure_admin(&auth_user.user_id)
        .await
        .inspect_err(|_| {
            tracing::warn!(user_id = %auth_user.user_id, "Admin access denied");
        })?;

    Ok(next.run(request).await)
}
