use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product record as stored in the products collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "3f0c8d52-7d7e-4f57-9a0e-5b1f8a3c2d10")]
    pub id: String,
    #[schema(example = "Pen")]
    pub name: String,
    #[schema(example = "Blue pen")]
    pub description: String,
    #[schema(example = 1.5, minimum = 0)]
    pub price: f64,
    #[schema(example = "office")]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

/// Data for a product that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
}

/// Merge-patch for a product. A provided zero is a value, not an absence.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<u32>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
    }

    /// Overwrites every provided field on `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}
