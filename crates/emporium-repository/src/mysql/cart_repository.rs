//! MySQL cart repository implementation.

use super::parse_id;
use crate::{traits::CartRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{
    Cart, CartId, CartItem, CartItemId, EmporiumError, EmporiumResult, ProductId, UserId,
};
use sqlx::{FromRow, MySql, Transaction};
use std::sync::Arc;
use tracing::debug;

/// MySQL cart repository implementation.
#[derive(Clone)]
pub struct MySqlCartRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlCartRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }

    async fn items_for(&self, cart_id: &str) -> EmporiumResult<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, cart_id, product_id, quantity
            FROM cart_items
            WHERE cart_id = ?
            ORDER BY position
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }
}

#[derive(Debug, FromRow)]
struct CartRow {
    id: String,
    owner_id: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CartItemRow {
    id: String,
    cart_id: String,
    product_id: String,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = EmporiumError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(CartItem {
            id: parse_id(&row.id)?,
            cart_id: parse_id(&row.cart_id)?,
            product_id: parse_id(&row.product_id)?,
            quantity: row.quantity,
        })
    }
}

async fn touch_cart(tx: &mut Transaction<'_, MySql>, cart_id: CartId) -> EmporiumResult<()> {
    sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(cart_id.to_string())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl CartRepository for MySqlCartRepository {
    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Option<Cart>> {
        debug!("Finding cart for user: {}", owner_id);

        let Some(row) = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, updated_at FROM carts WHERE owner_id = ?",
        )
        .bind(owner_id.to_string())
        .fetch_optional(self.pool.inner())
        .await?
        else {
            return Ok(None);
        };

        let items = self.items_for(&row.id).await?;
        Ok(Some(Cart {
            id: parse_id(&row.id)?,
            owner_id: parse_id(&row.owner_id)?,
            items,
            updated_at: row.updated_at,
        }))
    }

    async fn find_or_create(&self, owner_id: UserId) -> EmporiumResult<Cart> {
        if let Some(cart) = self.find_by_owner(owner_id).await? {
            return Ok(cart);
        }

        let cart = Cart::new(owner_id);
        debug!("Creating cart {} for user: {}", cart.id, owner_id);

        // A concurrent creator wins the unique owner key; re-read below.
        sqlx::query("INSERT IGNORE INTO carts (id, owner_id, updated_at) VALUES (?, ?, ?)")
            .bind(cart.id.to_string())
            .bind(owner_id.to_string())
            .bind(cart.updated_at)
            .execute(self.pool.inner())
            .await?;

        self.find_by_owner(owner_id)
            .await?
            .ok_or_else(|| EmporiumError::not_found("User", owner_id))
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartItem> {
        debug!("Adding {} x {} to cart {}", quantity, product_id, cart_id);

        let mut tx = self.pool.inner().begin().await?;

        sqlx::query(
            r"
            INSERT INTO cart_items (id, cart_id, product_id, quantity)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE quantity = quantity + VALUES(quantity)
            ",
        )
        .bind(CartItemId::new().to_string())
        .bind(cart_id.to_string())
        .bind(product_id.to_string())
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        touch_cart(&mut tx, cart_id).await?;

        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, cart_id, product_id, quantity
            FROM cart_items
            WHERE cart_id = ? AND product_id = ?
            ",
        )
        .bind(cart_id.to_string())
        .bind(product_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        CartItem::try_from(row)
    }

    async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<bool> {
        debug!("Setting {} to {} in cart {}", product_id, quantity, cart_id);

        let mut tx = self.pool.inner().begin().await?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM cart_items WHERE cart_id = ? AND product_id = ? FOR UPDATE",
        )
        .bind(cart_id.to_string())
        .bind(product_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(item_id) = existing else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        touch_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn remove_item(&self, cart_id: CartId, product_id: ProductId) -> EmporiumResult<bool> {
        debug!("Removing {} from cart {}", product_id, cart_id);

        let mut tx = self.pool.inner().begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
            .bind(cart_id.to_string())
            .bind(product_id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        touch_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn clear(&self, cart_id: CartId) -> EmporiumResult<u64> {
        debug!("Clearing cart {}", cart_id);

        let mut tx = self.pool.inner().begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id.to_string())
            .execute(&mut *tx)
            .await?;

        touch_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
