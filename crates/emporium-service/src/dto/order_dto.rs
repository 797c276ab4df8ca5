//! Order DTOs.

use chrono::{DateTime, Utc};
use emporium_core::{Order, OrderId, OrderItem, OrderStatus, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        let line_total = item.line_total();
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total,
        }
    }
}

/// Order response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub owner_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            owner_id: order.owner_id,
            placed_at: order.placed_at,
            status: order.status,
            total: order.total,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Request to move an order to a new status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_response_carries_line_totals() {
        let mut order = Order::place(UserId::new());
        order.add_line(ProductId::new(), 2, Decimal::TEN);
        order.add_line(ProductId::new(), 1, Decimal::new(5, 0));

        let response = OrderResponse::from(order);

        assert_eq!(response.total, Decimal::new(25, 0));
        assert_eq!(response.items[0].line_total, Decimal::new(20, 0));
        assert_eq!(response.status, OrderStatus::Placed);
    }

    #[test]
    fn test_order_status_request_uses_screaming_case() {
        let request: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status":"SHIPPED"}"#).unwrap();
        assert_eq!(request.status, OrderStatus::Shipped);
    }
}
