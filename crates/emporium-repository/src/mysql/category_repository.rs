//! MySQL category repository implementation.

use super::parse_id;
use crate::{traits::CategoryRepository, DatabasePool};
use async_trait::async_trait;
use emporium_core::{Category, CategoryId, EmporiumError, EmporiumResult};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL category repository implementation.
#[derive(Clone)]
pub struct MySqlCategoryRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlCategoryRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = EmporiumError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: parse_id(&row.id)?,
            name: row.name,
            description: row.description,
        })
    }
}

#[async_trait]
impl CategoryRepository for MySqlCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> EmporiumResult<Option<Category>> {
        debug!("Finding category by id: {}", id);

        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> EmporiumResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn find_all(&self) -> EmporiumResult<Vec<Category>> {
        debug!("Finding all categories");

        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn save(&self, category: &Category) -> EmporiumResult<Category> {
        debug!("Saving category: {}", category.name);

        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?, ?, ?)")
            .bind(category.id.to_string())
            .bind(&category.name)
            .bind(category.description.as_deref())
            .execute(self.pool.inner())
            .await?;

        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> EmporiumResult<Category> {
        debug!("Updating category: {}", category.id);

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?")
            .bind(category.id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;
        if exists.is_none() {
            return Err(EmporiumError::not_found("Category", category.id));
        }

        sqlx::query("UPDATE categories SET name = ?, description = ? WHERE id = ?")
            .bind(&category.name)
            .bind(category.description.as_deref())
            .bind(category.id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> EmporiumResult<bool> {
        debug!("Deleting category: {}", id);

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
