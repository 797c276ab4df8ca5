//! MySQL product repository implementation.

use super::parse_id;
use crate::{traits::ProductRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{CategoryId, EmporiumError, EmporiumResult, Product, ProductId};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL product repository implementation.
#[derive(Clone)]
pub struct MySqlProductRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlProductRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        clause: &str,
        binds: &[String],
    ) -> EmporiumResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} {clause} ORDER BY created_at, id");
        let mut query = sqlx::query_as::<_, ProductRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(self.pool.inner()).await?;

        rows.into_iter().map(Product::try_from).collect()
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category_id: String,
    image_url: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = EmporiumError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: parse_id(&row.id)?,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: parse_id(&row.category_id)?,
            image_url: row.image_url,
            created_by: row.created_by.as_deref().map(parse_id).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_PRODUCT: &str = r"
    SELECT id, name, description, price, stock, category_id, image_url,
           created_by, created_at, updated_at
    FROM products";

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn find_by_id(&self, id: ProductId) -> EmporiumResult<Option<Product>> {
        debug!("Finding product by id: {}", id);

        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn find_all(&self) -> EmporiumResult<Vec<Product>> {
        debug!("Finding all products");
        self.fetch_where("", &[]).await
    }

    async fn find_by_category(&self, category_id: CategoryId) -> EmporiumResult<Vec<Product>> {
        debug!("Finding products by category: {}", category_id);
        self.fetch_where("WHERE category_id = ?", &[category_id.to_string()])
            .await
    }

    async fn find_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> EmporiumResult<Vec<Product>> {
        debug!("Finding products priced between {} and {}", min, max);

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE price BETWEEN ? AND ? ORDER BY price, id"
        ))
        .bind(min)
        .bind(max)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn search(&self, term: &str) -> EmporiumResult<Vec<Product>> {
        debug!("Searching products for: {}", term);

        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        self.fetch_where(
            "WHERE LOWER(name) LIKE ? OR LOWER(description) LIKE ?",
            &[pattern.clone(), pattern],
        )
        .await
    }

    async fn save(&self, product: &Product) -> EmporiumResult<Product> {
        debug!("Saving product: {}", product.name);

        sqlx::query(
            r"
            INSERT INTO products (id, name, description, price, stock, category_id,
                                  image_url, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id.to_string())
        .bind(product.image_url.as_deref())
        .bind(product.created_by.map(|id| id.to_string()))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> EmporiumResult<Product> {
        debug!("Updating product: {}", product.id);

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(product.id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;
        if exists.is_none() {
            return Err(EmporiumError::not_found("Product", product.id));
        }

        sqlx::query(
            r"
            UPDATE products
            SET name = ?, description = ?, price = ?, stock = ?, category_id = ?,
                image_url = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id.to_string())
        .bind(product.image_url.as_deref())
        .bind(product.updated_at)
        .bind(product.id.to_string())
        .execute(self.pool.inner())
        .await?;

        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> EmporiumResult<bool> {
        debug!("Deleting product: {}", id);

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escapes `LIKE` wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
