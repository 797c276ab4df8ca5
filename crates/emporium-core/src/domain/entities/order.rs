//! Order aggregate.

use crate::domain::value_objects::OrderStatus;
use crate::{OrderId, OrderItemId, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchased line with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An immutable record of a checkout. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Starts a `PLACED` order with no items.
    #[must_use]
    pub fn place(owner_id: UserId) -> Self {
        Self {
            id: OrderId::new(),
            owner_id,
            placed_at: Utc::now(),
            status: OrderStatus::Placed,
            total: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    /// Appends a line and adds it to the running total.
    pub fn add_line(&mut self, product_id: ProductId, quantity: i32, unit_price: Decimal) {
        let item = OrderItem {
            id: OrderItemId::new(),
            order_id: self.id,
            product_id,
            quantity,
            unit_price,
        };
        self.total += item.line_total();
        self.items.push(item);
    }

    /// Sum of line totals.
    #[must_use]
    pub fn computed_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_accumulates_line_totals() {
        let mut order = Order::place(UserId::new());
        order.add_line(ProductId::new(), 2, Decimal::new(10, 0));
        order.add_line(ProductId::new(), 1, Decimal::new(5, 0));
        assert_eq!(order.total, Decimal::new(25, 0));
        assert_eq!(order.computed_total(), order.total);
        assert_eq!(order.status, OrderStatus::Placed);
        assert!(order.items.iter().all(|item| item.order_id == order.id));
    }
}
