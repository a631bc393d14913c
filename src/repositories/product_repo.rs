//! Product repository on top of the products collection.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repositories::JsonStore;
use crate::utils::identity::{Clock, IdGenerator};

/// Key of the products array inside its collection document.
pub const PRODUCTS_COLLECTION: &str = "products";

#[derive(Clone)]
pub struct ProductRepository {
    store: JsonStore<Product>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ProductRepository {
    pub fn new(
        store: JsonStore<Product>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, ids, clock }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError> {
        let product = self
            .store
            .read(|products| products.into_iter().find(|p| p.id == id))
            .await?;
        Ok(product)
    }

    /// Products whose category matches exactly, in insertion order.
    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        let products = self
            .store
            .read(|products| {
                products
                    .into_iter()
                    .filter(|p| p.category == category)
                    .collect()
            })
            .await?;
        Ok(products)
    }

    pub async fn list_all(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.store.load().await?)
    }

    pub async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let product = Product {
            id: self.ids.next_id(),
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            category: new_product.category,
            stock: new_product.stock,
            created_at: self.clock.now(),
        };
        let created = product.clone();
        self.store.mutate(move |products| products.push(product)).await?;
        Ok(created)
    }

    /// Applies a merge-patch to the product with `id`; `None` if missing.
    pub async fn update(
        &self,
        id: &str,
        update_data: UpdateProduct,
    ) -> Result<Option<Product>, AppError> {
        // Nothing to change: answer from a read without rewriting the file
        if update_data.is_empty() {
            return self.find_by_id(id).await;
        }

        let updated = self
            .store
            .mutate(|products| {
                let product = products.iter_mut().find(|p| p.id == id)?;
                update_data.apply(product);
                Some(product.clone())
            })
            .await?;
        Ok(updated)
    }

    /// Returns `true` if a product was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let removed = self
            .store
            .mutate(|products| {
                let before = products.len();
                products.retain(|p| p.id != id);
                products.len() != before
            })
            .await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::identity::{FixedClock, SequentialIdGenerator};
    use tempfile::TempDir;

    fn repo_in(dir: &TempDir) -> ProductRepository {
        ProductRepository::new(
            JsonStore::new(dir.path().join("products.json"), PRODUCTS_COLLECTION),
            Arc::new(SequentialIdGenerator::new("product")),
            Arc::new(FixedClock("2024-03-01T09:30:00Z".parse().unwrap())),
        )
    }

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            price: 2.5,
            category: category.to_string(),
            stock: 0,
        }
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let created = repo.create(new_product("Pen", "office")).await.unwrap();
        assert_eq!(created.id, "product-1");
        assert_eq!(created.stock, 0);
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_find_by_category_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let pen = repo.create(new_product("Pen", "office")).await.unwrap();
        repo.create(new_product("Apple", "food")).await.unwrap();
        let stapler = repo.create(new_product("Stapler", "office")).await.unwrap();

        let office = repo.find_by_category("office").await.unwrap();
        assert_eq!(office, vec![pen, stapler]);
        assert!(repo.find_by_category("Office").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_zero_stock() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let mut input = new_product("Pen", "office");
        input.stock = 40;
        let created = repo.create(input).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                UpdateProduct {
                    stock: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.stock, 0);
        assert_eq!(updated.price, created.price);
        assert_eq!(repo.find_by_id(&created.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_empty_update_returns_record_unchanged() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let created = repo.create(new_product("Pen", "office")).await.unwrap();
        let path = dir.path().join("products.json");
        let before = file_identity(&path);

        let updated = repo
            .update(&created.id, UpdateProduct::default())
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
    async fn test_delete_only_removes_matching_product() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let pen = repo.create(new_product("Pen", "office")).await.unwrap();
        let apple = repo.create(new_product("Apple", "food")).await.unwrap();

        assert!(repo.delete(&pen.id).await.unwrap());
        assert!(!repo.delete(&pen.id).await.unwrap());
        assert!(repo.find_by_id(&pen.id).await.unwrap().is_none());
        assert_eq!(repo.list_all().await.unwrap(), vec![apple]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_both_retained() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);

        let (a, b) = tokio::join!(
            repo.create(new_product("Pen", "office")),
            repo.create(new_product("Pencil", "office")),
        );
        a.unwrap();
        b.unwrap();

        let mut names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Pen", "Pencil"]);
    }
}
