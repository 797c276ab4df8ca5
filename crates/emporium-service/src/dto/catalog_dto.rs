//! Catalog DTOs.

use chrono::{DateTime, Utc};
use emporium_core::validation::rules::{not_blank, positive_price};
use emporium_core::{Category, CategoryId, Product, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a product.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name cannot exceed 255 characters")
    )]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,

    pub category_id: CategoryId,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    pub created_by: Option<UserId>,
}

/// Request to update a product. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "positive_price"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,

    pub category_id: Option<CategoryId>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    /// Applies the present fields to `product`.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if self.image_url.is_some() {
            product.image_url = self.image_url;
        }
        product.updated_at = Utc::now();
    }
}

/// Product response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let in_stock = product.is_in_stock();
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            image_url: product.image_url,
            in_stock,
            updated_at: product.updated_at,
        }
    }
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

/// Request to update a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

/// Category response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str, price: Decimal, stock: i32) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: String::new(),
            price,
            stock,
            category_id: CategoryId::new(),
            image_url: None,
            created_by: None,
        }
    }

    #[test]
    fn test_create_product_request_valid() {
        assert!(create_request("Lamp", Decimal::new(1999, 2), 3)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_create_product_request_rejects_blank_name() {
        assert!(create_request("  ", Decimal::ONE, 1).validate().is_err());
    }

    #[test]
    fn test_create_product_request_rejects_non_positive_price() {
        assert!(create_request("Lamp", Decimal::ZERO, 1).validate().is_err());
        assert!(create_request("Lamp", Decimal::NEGATIVE_ONE, 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_create_product_request_rejects_negative_stock() {
        assert!(create_request("Lamp", Decimal::ONE, -1).validate().is_err());
    }

    #[test]
    fn test_update_product_request_applies_present_fields() {
        let mut product = Product::new("Lamp", "desk lamp", Decimal::TEN, 2, CategoryId::new());
        UpdateProductRequest {
            price: Some(Decimal::new(1250, 2)),
            stock: Some(0),
            ..Default::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.name, "Lamp");
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert!(!product.is_in_stock());
    }
}
