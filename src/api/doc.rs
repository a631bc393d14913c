use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const USER_TAG: &str = "User";
pub const PRODUCT_TAG: &str = "Product";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront",
        description = "Users, products and JWT authentication over JSON file storage",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Signup, login and current user"),
        (name = USER_TAG, description = "User management endpoints (admin)"),
        (name = PRODUCT_TAG, description = "Product catalogue; writes require admin"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearerAuth` scheme referenced by protected operations.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/signup or /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
