//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserProfile;

/// Signup request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Ana", min_length = 1, max_length = 100)]
    pub name: String,
    /// User's email address (unique)
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "a@x.com", format = "email")]
    pub email: String,
    /// User's password (plain text, will be hashed)
    #[validate(length(min = 6, max = 128, message = "Password must be between 6 and 128 characters"))]
    #[schema(example = "password123", format = "password", min_length = 6, max_length = 128)]
    pub password: String,
    /// Request admin rights; only honoured when admin signup is enabled
    #[serde(default)]
    #[schema(example = false)]
    pub is_admin: bool,
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// User's email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "a@x.com", format = "email")]
    pub email: String,
    /// User's password (plain text)
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123", format = "password")]
    pub password: String,
}

/// Token plus the public profile of the authenticated user
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_is_admin_defaults_to_false() {
        let request: SignupRequest =
            serde_json::from_str(r#"{"name":"Ana","email":"a@x.com","password":"secret1"}"#)
                .unwrap();
        assert!(!request.is_admin);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_signup_reads_camel_case_admin_flag() {
        let request: SignupRequest = serde_json::from_str(
            r#"{"name":"Root","email":"r@x.com","password":"secret1","isAdmin":true}"#,
        )
        .unwrap();
        assert!(request.is_admin);
    }

    #[test]
    fn test_signup_validation() {
        let request = SignupRequest {
            name: String::new(),
            email: "nope".to_string(),
            password: "123".to_string(),
            is_admin: false,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
