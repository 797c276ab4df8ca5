//! Cart service implementation.

use crate::cache::CacheFacade;
use crate::cart_service::{CartLocks, CartService};
use crate::dto::{CartItemRequest, CartResponse};
use async_trait::async_trait;
use emporium_core::{Cart, EmporiumError, EmporiumResult, ProductId, UserId, ValidateExt};
use emporium_repository::{CartRepository, ProductRepository};
use std::sync::Arc;
use tracing::{debug, info};

/// Cart service backed by the cart and product repositories.
///
/// Mutations run under the user's [`CartLocks`] entry, write through the
/// repository and then invalidate `cart:{user}`. They return the cart as
/// re-read from the store and never populate the cache themselves.
pub struct CartServiceImpl {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
    cache: CacheFacade,
    locks: CartLocks,
}

impl CartServiceImpl {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductRepository>,
        cache: CacheFacade,
        locks: CartLocks,
    ) -> Self {
        Self {
            carts,
            products,
            cache,
            locks,
        }
    }

    async fn fresh_cart(&self, user_id: UserId) -> EmporiumResult<CartResponse> {
        let cart = self.carts.find_or_create(user_id).await?;
        Ok(CartResponse::from(cart))
    }

    async fn ensure_product_exists(&self, product_id: ProductId) -> EmporiumResult<()> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(EmporiumError::not_found("Product", product_id));
        }
        Ok(())
    }
}

fn missing_line(cart: &Cart, product_id: ProductId) -> EmporiumError {
    EmporiumError::not_found("CartItem", format!("{}/{}", cart.id, product_id))
}

#[async_trait]
impl CartService for CartServiceImpl {
    async fn get_cart(&self, user_id: UserId) -> EmporiumResult<CartResponse> {
        debug!("Getting cart for user: {}", user_id);
        let carts = Arc::clone(&self.carts);
        let cart = self
            .cache
            .cart(user_id, || async move { carts.find_or_create(user_id).await })
            .await?;
        Ok(CartResponse::from(cart))
    }

    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartResponse> {
        debug!(
            "Adding {} x product {} to cart of user {}",
            quantity, product_id, user_id
        );
        CartItemRequest::new(product_id, quantity).validate_request()?;

        let _guard = self.locks.lock(user_id).await;

        let cart = self.carts.find_or_create(user_id).await?;
        self.ensure_product_exists(product_id).await?;
        let item = self.carts.add_item(cart.id, product_id, quantity).await?;
        self.cache.invalidate_cart_cache(user_id).await;

        info!(
            "Cart {} now holds {} x product {}",
            cart.id, item.quantity, product_id
        );
        self.fresh_cart(user_id).await
    }

    async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartResponse> {
        debug!(
            "Setting product {} to {} in cart of user {}",
            product_id, quantity, user_id
        );
        CartItemRequest::new(product_id, quantity).validate_request()?;

        let _guard = self.locks.lock(user_id).await;

        let cart = self.carts.find_or_create(user_id).await?;
        if !self
            .carts
            .set_quantity(cart.id, product_id, quantity)
            .await?
        {
            return Err(missing_line(&cart, product_id));
        }
        self.cache.invalidate_cart_cache(user_id).await;

        info!("Cart {} line {} set to {}", cart.id, product_id, quantity);
        self.fresh_cart(user_id).await
    }

    async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> EmporiumResult<CartResponse> {
        debug!(
            "Removing product {} from cart of user {}",
            product_id, user_id
        );
        let _guard = self.locks.lock(user_id).await;

        let cart = self.carts.find_or_create(user_id).await?;
        if !self.carts.remove_item(cart.id, product_id).await? {
            return Err(missing_line(&cart, product_id));
        }
        self.cache.invalidate_cart_cache(user_id).await;

        info!("Removed product {} from cart {}", product_id, cart.id);
        self.fresh_cart(user_id).await
    }

    async fn clear_cart(&self, user_id: UserId) -> EmporiumResult<CartResponse> {
        debug!("Clearing cart of user {}", user_id);
        let _guard = self.locks.lock(user_id).await;

        let cart = self.carts.find_or_create(user_id).await?;
        let removed = self.carts.clear(cart.id).await?;
        self.cache.invalidate_cart_cache(user_id).await;

        info!("Cleared {} lines from cart {}", removed, cart.id);
        self.fresh_cart(user_id).await
    }
}
