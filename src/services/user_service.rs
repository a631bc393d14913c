//! User service for business logic operations.
//!
//! Provides a higher-level API for user operations: password hashing,
//! email uniqueness on creation, credential checks and the admin check.

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UpdateUser, User, UserProfile};
use crate::repositories::UserRepository;
use crate::utils::password::{hash_password, verify_password};

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Data for registering a user, password still in plain text.
#[derive(Debug, Clone)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// Requested changes to a user. `password` is plain text and gets hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// User service for handling user-related business logic.
///
/// Cloning is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    /// Creates a new UserService with the given repository.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Creates a new user after hashing the password.
    ///
    /// # Returns
    /// The created user, or `Duplicate` if the email is already registered
    pub async fn create_user(&self, registration: UserRegistration) -> AppResult<User> {
        let password_hash = hash_password(&registration.password)?;
        let email = registration.email.clone();

        let created = self
            .repo
            .create_if_email_available(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                is_admin: registration.is_admin,
            })
            .await?;

        match created {
            Some(user) => {
                tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User created");
                Ok(user)
            }
            None => Err(AppError::duplicate("user", "email", email)),
        }
    }

    /// Gets a user by their ID.
    ///
    /// # Returns
    /// The user if found, or `NotFound` error
    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))
    }

    /// Gets the public profile of a user.
    pub async fn get_profile(&self, id: &str) -> AppResult<UserProfile> {
        self.get_user(id).await.map(UserProfile::from)
    }

    /// Lists all users as public profiles.
    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        self.repo.list_profiles().await
    }

    /// Applies `changes` to a user, hashing a new password if one is given.
    ///
    /// # Returns
    /// The updated user, or `NotFound` error
    pub async fn update_user(&self, id: &str, changes: UserChanges) -> AppResult<User> {
        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;
        let update_data = UpdateUser {
            name: changes.name,
            email: changes.email,
            password_hash,
            is_admin: changes.is_admin,
        };

        let updated = self
            .repo
            .update(id, update_data)
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))?;
        tracing::info!(user_id = %updated.id, "User updated");
        Ok(updated)
    }

    /// Deletes a user.
    ///
    /// # Returns
    /// `NotFound` error if no user has this ID
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("user", "id", id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Checks credentials and returns the matching user.
    ///
    /// Unknown email and wrong password produce the same `Unauthorized` error.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &user.password)? {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(user)
    }

    /// Loads the user behind a principal and requires the admin flag.
    ///
    /// A principal whose record no longer exists is treated like a
    /// non-admin.
    pub async fn ensure_admin(&self, user_id: &str) -> AppResult<User> {
        match self.repo.find_by_id(user_id).await? {
            Some(user) if user.is_admin => Ok(user),
            _ => Err(AppError::forbidden("Admin access required")),
        }
    }
}
