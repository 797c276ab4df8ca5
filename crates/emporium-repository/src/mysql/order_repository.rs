//! MySQL order repository implementation.

use super::parse_id;
use crate::{traits::OrderRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{
    EmporiumError, EmporiumResult, Order, OrderId, OrderItem, OrderStatus, UserId,
};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// MySQL order repository implementation.
#[derive(Clone)]
pub struct MySqlOrderRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlOrderRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    owner_id: String,
    placed_at: DateTime<Utc>,
    status: String,
    total: Decimal,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = EmporiumError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(OrderItem {
            id: parse_id(&row.id)?,
            order_id: parse_id(&row.order_id)?,
            product_id: parse_id(&row.product_id)?,
            quantity: row.quantity,
            unit_price: row.unit_price,
        })
    }
}

fn order_from_row(row: OrderRow, items: Vec<OrderItem>) -> EmporiumResult<Order> {
    let status = OrderStatus::parse(&row.status).ok_or_else(|| {
        EmporiumError::Internal(format!("Unknown order status in database: {}", row.status))
    })?;

    Ok(Order {
        id: parse_id(&row.id)?,
        owner_id: parse_id(&row.owner_id)?,
        placed_at: row.placed_at,
        status,
        total: row.total,
        items,
    })
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn create(&self, order: &Order) -> EmporiumResult<Order> {
        debug!("Persisting order {} with {} items", order.id, order.items.len());

        let mut tx = self.pool.inner().begin().await?;

        sqlx::query(
            r"
            INSERT INTO orders (id, owner_id, placed_at, status, total)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(order.id.to_string())
        .bind(order.owner_id.to_string())
        .bind(order.placed_at)
        .bind(order.status.as_str())
        .bind(order.total)
        .execute(&mut *tx)
        .await?;

        for (position, item) in (0_i32..).zip(&order.items) {
            sqlx::query(
                r"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, position)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(item.id.to_string())
            .bind(order.id.to_string())
            .bind(item.product_id.to_string())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Order {} persisted", order.id);
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: OrderId) -> EmporiumResult<Option<Order>> {
        debug!("Finding order by id: {}", id);

        let Some(row) = sqlx::query_as::<_, OrderRow>(
            "SELECT id, owner_id, placed_at, status, total FROM orders WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = ?
            ORDER BY position
            ",
        )
        .bind(&row.id)
        .fetch_all(self.pool.inner())
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<EmporiumResult<Vec<_>>>()?;

        order_from_row(row, items).map(Some)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Vec<Order>> {
        debug!("Finding orders for user: {}", owner_id);

        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, owner_id, placed_at, status, total
            FROM orders
            WHERE owner_id = ?
            ORDER BY placed_at DESC, id DESC
            ",
        )
        .bind(owner_id.to_string())
        .fetch_all(self.pool.inner())
        .await?;

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.owner_id = ?
            ORDER BY oi.order_id, oi.position
            ",
        )
        .bind(owner_id.to_string())
        .fetch_all(self.pool.inner())
        .await?;

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item_row in item_rows {
            let order_id = item_row.order_id.clone();
            items_by_order
                .entry(order_id)
                .or_default()
                .push(OrderItem::try_from(item_row)?);
        }

        rows.into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                order_from_row(row, items)
            })
            .collect()
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> EmporiumResult<bool> {
        debug!("Updating order {} status to {}", id, status);

        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
