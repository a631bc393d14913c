//! Product-related DTOs for API requests.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewProduct, UpdateProduct};

/// Request body for creating a product.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Pen")]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "Blue pen")]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[schema(example = 1.5, minimum = 0)]
    pub price: f64,
    #[validate(length(min = 1, message = "Category is required"))]
    #[schema(example = "office")]
    pub category: String,
    /// Units in stock, 0 when absent
    #[schema(example = 0)]
    pub stock: Option<u32>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock.unwrap_or(0),
        }
    }
}

/// Request body for updating a product. A provided `0` is applied.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[schema(minimum = 0)]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,
    pub stock: Option<u32>,
}

impl UpdateProductRequest {
    pub fn into_update_product(self) -> UpdateProduct {
        UpdateProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_defaults_to_zero_on_create() {
        let request: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Pen","description":"Blue pen","price":1.5,"category":"office"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.into_new_product().stock, 0);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let request: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Pen","description":"Blue pen","price":-0.5,"category":"office"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_stock_does_not_deserialize() {
        let result = serde_json::from_str::<UpdateProductRequest>(r#"{"stock":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_values_survive_into_update() {
        let request: UpdateProductRequest =
            serde_json::from_str(r#"{"stock":0,"price":0}"#).unwrap();
        let update = request.into_update_product();
        assert_eq!(update.stock, Some(0));
        assert_eq!(update.price, Some(0.0));
        assert!(update.name.is_none());
    }
}
