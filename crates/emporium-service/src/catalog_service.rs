//! Catalog service trait definition.

use crate::dto::{
    CategoryResponse, CreateCategoryRequest, CreateProductRequest, ProductResponse,
    UpdateCategoryRequest, UpdateProductRequest,
};
use async_trait::async_trait;
use emporium_core::{CategoryId, EmporiumResult, ProductId};
use rust_decimal::Decimal;

/// Products and categories.
///
/// Single-item reads go through the cache; writes hit the store first and then
/// invalidate the affected keys.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Gets a product by ID.
    async fn get_product(&self, id: ProductId) -> EmporiumResult<ProductResponse>;

    /// Lists all products.
    async fn list_products(&self) -> EmporiumResult<Vec<ProductResponse>>;

    /// Lists the products of a category.
    async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> EmporiumResult<Vec<ProductResponse>>;

    /// Lists products priced within `[min, max]`.
    async fn products_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> EmporiumResult<Vec<ProductResponse>>;

    /// Searches product names and descriptions.
    async fn search_products(&self, term: &str) -> EmporiumResult<Vec<ProductResponse>>;

    /// Creates a product.
    async fn create_product(&self, request: CreateProductRequest)
        -> EmporiumResult<ProductResponse>;

    /// Updates a product.
    async fn update_product(
        &self,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> EmporiumResult<ProductResponse>;

    /// Deletes a product.
    async fn delete_product(&self, id: ProductId) -> EmporiumResult<()>;

    /// Lists all categories by name.
    async fn list_categories(&self) -> EmporiumResult<Vec<CategoryResponse>>;

    /// Gets a category by ID.
    async fn get_category(&self, id: CategoryId) -> EmporiumResult<CategoryResponse>;

    /// Creates a category.
    async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> EmporiumResult<CategoryResponse>;

    /// Updates a category.
    async fn update_category(
        &self,
        id: CategoryId,
        request: UpdateCategoryRequest,
    ) -> EmporiumResult<CategoryResponse>;

    /// Deletes a category.
    async fn delete_category(&self, id: CategoryId) -> EmporiumResult<()>;
}
