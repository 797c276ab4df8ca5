//! Cart DTOs.

use chrono::{DateTime, Utc};
use emporium_core::{Cart, CartId, CartItem, ProductId, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to add a product to a cart, or to set a line's quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct CartItemRequest {
    pub product_id: ProductId,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

impl CartItemRequest {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Cart response DTO. Items keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: CartId,
    pub owner_id: UserId,
    pub items: Vec<CartItemResponse>,
    pub total_quantity: i64,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    /// Quantity of the line for `product_id`, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<i32> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let total_quantity = cart.total_quantity();
        Self {
            id: cart.id,
            owner_id: cart.owner_id,
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            total_quantity,
            updated_at: cart.updated_at,
        }
    }
}
