//! Checkout service trait definition.

use crate::dto::OrderResponse;
use async_trait::async_trait;
use emporium_core::{EmporiumResult, OrderId, OrderStatus, UserId};

/// Turns carts into orders and manages order lifecycle.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Converts the user's cart into a placed order and empties the cart.
    async fn place_order(&self, user_id: UserId) -> EmporiumResult<OrderResponse>;

    /// The user's orders, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> EmporiumResult<Vec<OrderResponse>>;

    /// Gets an order by ID.
    async fn get_order(&self, id: OrderId) -> EmporiumResult<OrderResponse>;

    /// Moves an order along its lifecycle.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> EmporiumResult<OrderResponse>;
}
