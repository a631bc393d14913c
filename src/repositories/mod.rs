//! Repository layer for data access operations.
//!
//! Every repository sits on a [`JsonStore`] that persists one collection as
//! a single JSON document.

mod product_repo;
mod store;
mod user_repo;

pub use product_repo::{PRODUCTS_COLLECTION, ProductRepository};
pub use store::{JsonStore, StoreError};
pub use user_repo::{USERS_COLLECTION, UserRepository};

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::utils::identity::{Clock, IdGenerator};

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap; clones share the per-collection store locks.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub products: ProductRepository,
}

impl Repositories {
    /// Creates the repositories over the collection files named in `storage`.
    pub fn new(storage: &StorageConfig, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserRepository::new(
                JsonStore::new(storage.users_path(), USERS_COLLECTION),
                Arc::clone(&ids),
                Arc::clone(&clock),
            ),
            products: ProductRepository::new(
                JsonStore::new(storage.products_path(), PRODUCTS_COLLECTION),
                ids,
                clock,
            ),
        }
    }
}
