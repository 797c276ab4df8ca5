//! Checkout service implementation.

use crate::cache::CacheFacade;
use crate::cart_service::CartLocks;
use crate::checkout_service::CheckoutService;
use crate::dto::OrderResponse;
use async_trait::async_trait;
use emporium_core::{EmporiumError, EmporiumResult, Order, OrderId, OrderStatus, UserId};
use emporium_repository::{CartRepository, OrderRepository, ProductRepository, UserRepository};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Repositories the checkout workflow reads from and writes to.
#[derive(Clone)]
pub struct CheckoutRepositories {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

/// Checkout service.
///
/// `place_order` holds the user's cart lock for the whole workflow, so no cart
/// mutation can slip in between pricing the cart and emptying it.
pub struct CheckoutServiceImpl {
    repos: CheckoutRepositories,
    cache: CacheFacade,
    locks: CartLocks,
}

impl CheckoutServiceImpl {
    pub fn new(repos: CheckoutRepositories, cache: CacheFacade, locks: CartLocks) -> Self {
        Self {
            repos,
            cache,
            locks,
        }
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> EmporiumResult<()> {
        if self.repos.users.find_by_id(user_id).await?.is_none() {
            return Err(EmporiumError::not_found("User", user_id));
        }
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> EmporiumResult<Order> {
        self.repos
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| EmporiumError::not_found("Order", id))
    }
}

#[async_trait]
impl CheckoutService for CheckoutServiceImpl {
    async fn place_order(&self, user_id: UserId) -> EmporiumResult<OrderResponse> {
        debug!("Placing order for user: {}", user_id);
        self.ensure_user_exists(user_id).await?;

        let _guard = self.locks.lock(user_id).await;

        let cart = match self.repos.carts.find_by_owner(user_id).await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => return Err(EmporiumError::validation("cart is empty")),
        };

        let mut order = Order::place(user_id);
        for item in &cart.items {
            let product = self
                .repos
                .products
                .find_by_id(item.product_id)
                .await?
                .ok_or_else(|| EmporiumError::not_found("Product", item.product_id))?;
            order.add_line(product.id, item.quantity, product.price);
        }

        let placed = self.repos.orders.create(&order).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Order persistence failed, cart left intact");
            e
        })?;

        self.repos.carts.clear(cart.id).await?;
        self.cache.invalidate_cart_cache(user_id).await;

        info!(
            "Order {} placed for user {}: {} lines, total {}",
            placed.id,
            user_id,
            placed.items.len(),
            placed.total
        );
        Ok(OrderResponse::from(placed))
    }

    async fn orders_for_user(&self, user_id: UserId) -> EmporiumResult<Vec<OrderResponse>> {
        debug!("Listing orders for user: {}", user_id);
        self.ensure_user_exists(user_id).await?;

        let orders = self.repos.orders.find_by_owner(user_id).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    async fn get_order(&self, id: OrderId) -> EmporiumResult<OrderResponse> {
        debug!("Getting order: {}", id);
        Ok(OrderResponse::from(self.find_order(id).await?))
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> EmporiumResult<OrderResponse> {
        debug!("Moving order {} to {}", id, status.as_str());

        let mut order = self.find_order(id).await?;
        if !order.status.can_transition_to(status) {
            return Err(EmporiumError::validation(format!(
                "Cannot move order from {} to {}",
                order.status.as_str(),
                status.as_str()
            )));
        }

        if !self.repos.orders.update_status(id, status).await? {
            return Err(EmporiumError::not_found("Order", id));
        }
        order.status = status;

        info!("Order {} is now {}", id, status.as_str());
        Ok(OrderResponse::from(order))
    }
}
