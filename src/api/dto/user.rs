//! User-related DTOs for API requests.
//!
//! Responses use [`crate::models::UserProfile`] directly.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::services::{UserChanges, UserRegistration};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a new user.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(min_length = 1, max_length = 100)]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email")]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"))]
    #[schema(format = "password", min_length = 6, max_length = 128)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl CreateUserRequest {
    /// Converts the request DTO into a registration for the user service.
    pub fn into_registration(self) -> UserRegistration {
        UserRegistration {
            name: self.name,
            email: self.email,
            password: self.password,
            is_admin: self.is_admin,
        }
    }
}

/// Request body for updating a user. Absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email")]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"))]
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UpdateUserRequest {
    /// Converts the request DTO into changes for the user service.
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            name: self.name,
            email: self.email,
            password: self.password,
            is_admin: self.is_admin,
        }
    }
}
