//! Cart aggregate.

use crate::{CartId, CartItemId, EmporiumError, EmporiumResult, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A line in a cart. At most one per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartItem {
    #[must_use]
    pub fn new(cart_id: CartId, product_id: ProductId, quantity: i32) -> Self {
        Self {
            id: CartItemId::new(),
            cart_id,
            product_id,
            quantity,
        }
    }
}

/// A user's shopping cart. Exactly one per user; checkout empties it but the
/// cart itself persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner_id: UserId,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for `owner_id`.
    #[must_use]
    pub fn new(owner_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            owner_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line holding `product_id`, if any.
    #[must_use]
    pub fn item_for(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// Adds `quantity` to the line for `product_id`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the merged quantity would not fit in an
    /// `i32`. The cart is left untouched in that case.
    pub fn add_quantity(&mut self, product_id: ProductId, quantity: i32) -> EmporiumResult<()> {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                EmporiumError::validation(format!(
                    "quantity for product {product_id} exceeds the maximum of {}",
                    i32::MAX
                ))
            })?;
        } else {
            self.items.push(CartItem::new(self.id, product_id, quantity));
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the absolute quantity of an existing line. Returns false if the
    /// product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        else {
            return false;
        };
        item.quantity = quantity;
        self.updated_at = Utc::now();
        true
    }

    /// Removes the line for `product_id`. Returns false if it was absent.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantity_merges_lines() {
        let mut cart = Cart::new(UserId::new());
        let product = ProductId::new();
        cart.add_quantity(product, 2).unwrap();
        cart.add_quantity(product, 3).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_for(product).unwrap().quantity, 5);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_quantity_rejects_overflow() {
        let mut cart = Cart::new(UserId::new());
        let product = ProductId::new();
        cart.add_quantity(product, i32::MAX).unwrap();

        let err = cart.add_quantity(product, 1).unwrap_err();
        assert!(matches!(err, EmporiumError::Validation(_)));
        assert_eq!(cart.item_for(product).unwrap().quantity, i32::MAX);
    }

    #[test]
    fn test_set_quantity_requires_existing_line() {
        let mut cart = Cart::new(UserId::new());
        assert!(!cart.set_quantity(ProductId::new(), 4));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new(UserId::new());
        let a = ProductId::new();
        let b = ProductId::new();
        cart.add_quantity(a, 1).unwrap();
        cart.add_quantity(b, 1).unwrap();
        assert!(cart.remove(a));
        assert!(!cart.remove(a));
        cart.clear();
        assert!(cart.is_empty());
    }
}
