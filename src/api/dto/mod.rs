//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `auth` - Signup/login payloads and the token response
//! - `user` - User management requests
//! - `product` - Product catalogue requests
//! - `health` - Health check response
//! - `error` - Common error response DTOs

mod auth;
mod error;
mod health;
mod product;
mod user;

pub use auth::{AuthResponse, LoginRequest, SignupRequest};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use product::{CreateProductRequest, UpdateProductRequest};
pub use user::{CreateUserRequest, UpdateUserRequest};
