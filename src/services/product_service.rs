//! Product service for business logic operations.

use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, Product, UpdateProduct};
use crate::repositories::ProductRepository;

/// Product catalogue operations.
#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub async fn create_product(&self, new_product: NewProduct) -> AppResult<Product> {
        let product = self.repo.create(new_product).await?;
        tracing::info!(product_id = %product.id, category = %product.category, "Product created");
        Ok(product)
    }

    /// Gets a product by ID, or `NotFound`.
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", id))
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.repo.list_all().await
    }

    /// Products in `category`; an unknown category is simply empty.
    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        self.repo.find_by_category(category).await
    }

    pub async fn update_product(&self, id: &str, update_data: UpdateProduct) -> AppResult<Product> {
        let product = self
            .repo
            .update(id, update_data)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", id))?;
        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("product", "id", id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repositories::{JsonStore, PRODUCTS_COLLECTION};
    use crate::utils::identity::{SequentialIdGenerator, SystemClock};
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> ProductService {
        ProductService::new(ProductRepository::new(
            JsonStore::new(dir.path().join("products.json"), PRODUCTS_COLLECTION),
            Arc::new(SequentialIdGenerator::new("product")),
            Arc::new(SystemClock),
        ))
    }

    fn pen() -> NewProduct {
        NewProduct {
            name: "Pen".to_string(),
            description: "Blue pen".to_string(),
            price: 1.5,
            category: "office".to_string(),
            stock: 0,
        }
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        let error = service.get_product("nope").await.unwrap_err();
        assert_eq!(error.to_string(), "Resource not found: product with id=nope");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_product_are_not_found() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        assert!(matches!(
            service.update_product("nope", UpdateProduct::default()).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_product("nope").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_category_listing() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);
        let created = service.create_product(pen()).await.unwrap();

        assert_eq!(service.list_by_category("office").await.unwrap(), vec![created]);
        assert!(service.list_by_category("food").await.unwrap().is_empty());
    }
}
