//! User repository on top of the users collection.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewUser, UpdateUser, User, UserProfile};
use crate::repositories::JsonStore;
use crate::utils::identity::{Clock, IdGenerator};

/// Key of the users array inside its collection document.
pub const USERS_COLLECTION: &str = "users";

/// User repository holding the users store and the id/time sources.
///
/// Cloning is cheap; clones share the store lock.
#[derive(Clone)]
pub struct UserRepository {
    store: JsonStore<User>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl UserRepository {
    /// Creates a new UserRepository over `store`.
    pub fn new(store: JsonStore<User>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { store, ids, clock }
    }

    /// Finds a user by their email address (case-sensitive exact match).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = self
            .store
            .read(|users| users.into_iter().find(|u| u.email == email))
            .await?;
        Ok(user)
    }

    /// Finds a user by their ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = self
            .store
            .read(|users| users.into_iter().find(|u| u.id == id))
            .await?;
        Ok(user)
    }

    /// Lists every user in stored order, without password hashes.
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        let profiles = self
            .store
            .read(|users| users.into_iter().map(UserProfile::from).collect())
            .await?;
        Ok(profiles)
    }

    /// Appends a new user. No uniqueness check happens here.
    pub async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = self.build(new_user);
        let created = user.clone();
        self.store.mutate(move |users| users.push(user)).await?;
        Ok(created)
    }

    /// Appends a new user unless another user already has the same email.
    ///
    /// The check and the append happen in one locked mutation. Returns
    /// `None` when the email is taken.
    pub async fn create_if_email_available(
        &self,
        new_user: NewUser,
    ) -> Result<Option<User>, AppError> {
        let user = self.build(new_user);
        let created = self
            .store
            .mutate(move |users| {
                if users.iter().any(|u| u.email == user.email) {
                    return None;
                }
                users.push(user.clone());
                Some(user)
            })
            .await?;
        Ok(created)
    }

    /// Applies a merge-patch to the user with `id`.
    ///
    /// Returns `None` if no user matches.
    pub async fn update(&self, id: &str, update_data: UpdateUser) -> Result<Option<User>, AppError> {
        // Nothing to change: answer from a read without rewriting the file
        if update_data.is_empty() {
            return self.find_by_id(id).await;
        }

        let updated = self
            .store
            .mutate(|users| {
                let user = users.iter_mut().find(|u| u.id == id)?;
                update_data.apply(user);
                Some(user.clone())
            })
            .await?;
        Ok(updated)
    }

    /// Deletes the user with `id`.
    ///
    /// Returns `true` if a user was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let removed = self
            .store
            .mutate(|users| {
                let before = users.len();
                users.retain(|u| u.id != id);
                users.len() != before
            })
            .await?;
        Ok(removed)
    }

    fn build(&self, new_user: NewUser) -> User {
        User {
            id: self.ids.next_id(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password_hash,
            is_admin: new_user.is_admin,
            created_at: self.clock.now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::identity::{FixedClock, SequentialIdGenerator};
    use tempfile::TempDir;

    fn repo_in(dir: &TempDir) -> UserRepository {
        UserRepository::new(
            JsonStore::new(dir.path().join("users.json"), USERS_COLLECTION),
            Arc::new(SequentialIdGenerator::new("user")),
            Arc::new(FixedClock("2024-03-01T09:30:00Z".parse().unwrap())),
        )
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: format!("hash-of-{name}"),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let user = repo.create(new_user("Ana", "a@x.com")).await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.created_at.to_string(), "2024-03-01T09:30:00Z");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_create_then_find_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let created = repo.create(new_user("Ana", "a@x.com")).await.unwrap();

        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_email("a@x.com").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        repo.create(new_user("Ana", "a@x.com")).await.unwrap();

        assert!(repo.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_does_not_enforce_uniqueness() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        repo.create(new_user("Ana", "a@x.com")).await.unwrap();
        repo.create(new_user("Ana again", "a@x.com")).await.unwrap();

        assert_eq!(repo.list_profiles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_if_email_available_rejects_taken_email() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let first = repo
            .create_if_email_available(new_user("Ana", "a@x.com"))
            .await
            .unwrap();
        let second = repo
            .create_if_email_available(new_user("Other", "a@x.com"))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(repo.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_signups_with_same_email_keep_one() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let (a, b) = tokio::join!(
            repo.create_if_email_available(new_user("A", "same@x.com")),
            repo.create_if_email_available(new_user("B", "same@x.com")),
        );
        let created = [a.unwrap(), b.unwrap()].into_iter().flatten().count();

        assert_eq!(created, 1);
        assert_eq!(repo.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_profiles_projects_public_fields() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        repo.create(new_user("Ana", "a@x.com")).await.unwrap();

        let profiles = repo.list_profiles().await.unwrap();
        let json = serde_json::to_value(&profiles).unwrap();
        assert!(json[0].get("password").is_none());
        assert_eq!(json[0]["name"], "Ana");
    }

    #[tokio::test]
    async fn test_update_is_merge_patch() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let created = repo.create(new_user("Ana", "a@x.com")).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.is_admin);
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.password, created.password);
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_empty_update_returns_record_unchanged() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let created = repo.create(new_user("Ana", "a@x.com")).await.unwrap();
        let path = dir.path().join("users.json");
        let before = file_identity(&path);

        let updated = repo
            .update(&created.id, UpdateUser::default())
            .await
            .unwrap();
        assert_eq!(updated, Some(created));
        // Replacing the file would give it a new inode
        assert_eq!(file_identity(&path), before);
    }

    #[cfg(unix)]
    fn file_identity(path: &std::path::Path) -> u64 {
        std::os::unix::fs::MetadataExt::ino(&std::fs::metadata(path).unwrap())
    }

    #[cfg(not(unix))]
    fn file_identity(path: &std::path::Path) -> u64 {
        std::fs::metadata(path).unwrap().len()
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let updated = repo
            .update("nope", UpdateUser::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let created = repo.create(new_user("Ana", "a@x.com")).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        assert!(!repo.delete("ghost").await.unwrap());
    }
}
