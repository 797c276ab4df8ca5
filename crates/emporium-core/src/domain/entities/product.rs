//! Product entity.

use crate::{CategoryId, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub name: String,

    pub description: String,

    /// Current unit price. Always positive.
    pub price: Decimal,

    /// Units in stock. Never negative.
    pub stock: i32,

    pub category_id: CategoryId,

    pub image_url: Option<String>,

    /// Seller that listed the product.
    pub created_by: Option<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a fresh id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: i32,
        category_id: CategoryId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            price,
            stock,
            category_id,
            image_url: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match on name or description.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }

    /// Whether the price lies within `[min, max]`.
    #[must_use]
    pub fn priced_between(&self, min: Decimal, max: Decimal) -> bool {
        self.price >= min && self.price <= max
    }
}
