//! Cart service trait definition and per-user serialization.

use crate::dto::CartResponse;
use async_trait::async_trait;
use dashmap::DashMap;
use emporium_core::{EmporiumResult, ProductId, UserId};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-user cart. Every mutation invalidates `cart:{user}`.
#[async_trait]
pub trait CartService: Send + Sync {
    /// The user's cart, created empty on first access.
    async fn get_cart(&self, user_id: UserId) -> EmporiumResult<CartResponse>;

    /// Adds `quantity` of a product, merging with an existing line.
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartResponse>;

    /// Sets the quantity of an existing line.
    async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartResponse>;

    /// Removes a line.
    async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> EmporiumResult<CartResponse>;

    /// Removes every line, keeping the cart.
    async fn clear_cart(&self, user_id: UserId) -> EmporiumResult<CartResponse>;
}

/// Serializes cart mutations and checkout per user.
///
/// Shared between the cart and checkout services so a checkout cannot
/// interleave with an add on the same cart.
#[derive(Debug, Clone, Default)]
pub struct CartLocks {
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl CartLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`'s cart.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        // Clone the mutex out so the shard guard is released before awaiting.
        let mutex = Arc::clone(self.locks.entry(user_id).or_default().value());
        mutex.lock_owned().await
    }

    /// Number of users that have held a lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
