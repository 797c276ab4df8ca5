//! Catalog service implementation.

use crate::cache::CacheFacade;
use crate::catalog_service::CatalogService;
use crate::dto::{
    CategoryResponse, CreateCategoryRequest, CreateProductRequest, ProductResponse,
    UpdateCategoryRequest, UpdateProductRequest,
};
use async_trait::async_trait;
use emporium_core::{
    Category, CategoryId, EmporiumError, EmporiumResult, Product, ProductId, ValidateExt,
};
use emporium_repository::{CategoryRepository, ProductRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

/// Catalog service backed by the product and category repositories.
pub struct CatalogServiceImpl {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    cache: CacheFacade,
}

impl CatalogServiceImpl {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        cache: CacheFacade,
    ) -> Self {
        Self {
            products,
            categories,
            cache,
        }
    }

    async fn load_product(&self, id: ProductId) -> EmporiumResult<Product> {
        let products = Arc::clone(&self.products);
        self.cache
            .product(id, || async move {
                products
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| EmporiumError::not_found("Product", id))
            })
            .await
    }

    async fn load_category(&self, id: CategoryId) -> EmporiumResult<Category> {
        let categories = Arc::clone(&self.categories);
        self.cache
            .category(id, || async move {
                categories
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| EmporiumError::not_found("Category", id))
            })
            .await
    }

    async fn ensure_category_exists(&self, id: CategoryId) -> EmporiumResult<()> {
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(EmporiumError::not_found("Category", id));
        }
        Ok(())
    }

    async fn ensure_category_name_free(
        &self,
        name: &str,
        except: Option<CategoryId>,
    ) -> EmporiumResult<()> {
        if let Some(existing) = self.categories.find_by_name(name).await? {
            if Some(existing.id) != except {
                return Err(EmporiumError::conflict(format!(
                    "Category '{name}' already exists"
                )));
            }
        }
        Ok(())
    }

    /// Product writes change what searches return.
    async fn after_product_write(&self, id: ProductId) {
        self.cache.invalidate_product(id).await;
        let dropped = self.cache.invalidate_all_search_results().await;
        debug!("Dropped {} cached searches after product {} changed", dropped, id);
    }

    async fn after_category_write(&self, id: Option<CategoryId>) {
        if let Some(id) = id {
            self.cache.invalidate_category(id).await;
        }
        self.cache.invalidate_all_categories().await;
    }
}

fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn get_product(&self, id: ProductId) -> EmporiumResult<ProductResponse> {
        debug!("Getting product: {}", id);
        Ok(ProductResponse::from(self.load_product(id).await?))
    }

    async fn list_products(&self) -> EmporiumResult<Vec<ProductResponse>> {
        debug!("Listing products");
        Ok(to_responses(self.products.find_all().await?))
    }

    async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> EmporiumResult<Vec<ProductResponse>> {
        debug!("Listing products in category: {}", category_id);
        self.ensure_category_exists(category_id).await?;
        Ok(to_responses(
            self.products.find_by_category(category_id).await?,
        ))
    }

    async fn products_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> EmporiumResult<Vec<ProductResponse>> {
        debug!("Listing products priced {} to {}", min, max);
        if min.is_sign_negative() || max.is_sign_negative() {
            return Err(EmporiumError::validation("Price bounds cannot be negative"));
        }
        if min > max {
            return Err(EmporiumError::validation(format!(
                "Minimum price {min} exceeds maximum price {max}"
            )));
        }
        Ok(to_responses(
            self.products.find_by_price_range(min, max).await?,
        ))
    }

    async fn search_products(&self, term: &str) -> EmporiumResult<Vec<ProductResponse>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(EmporiumError::validation("Search term cannot be blank"));
        }
        debug!("Searching products: '{}'", term);

        let products = Arc::clone(&self.products);
        let owned = term.to_string();
        let found = self
            .cache
            .search(term, || async move { products.search(&owned).await })
            .await?;
        Ok(to_responses(found))
    }

    async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> EmporiumResult<ProductResponse> {
        debug!("Creating product: {}", request.name);
        request.validate_request()?;
        self.ensure_category_exists(request.category_id).await?;

        let mut product = Product::new(
            request.name.trim(),
            request.description,
            request.price,
            request.stock,
            request.category_id,
        );
        product.image_url = request.image_url;
        product.created_by = request.created_by;

        let saved = self.products.save(&product).await?;
        self.after_product_write(saved.id).await;

        info!("Product created: {}", saved.id);
        Ok(ProductResponse::from(saved))
    }

    async fn update_product(
        &self,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> EmporiumResult<ProductResponse> {
        debug!("Updating product: {}", id);
        request.validate_request()?;

        let mut product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| EmporiumError::not_found("Product", id))?;

        if let Some(category_id) = request.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        request.apply_to(&mut product);

        let updated = self.products.update(&product).await?;
        self.after_product_write(id).await;

        info!("Product updated: {}", id);
        Ok(ProductResponse::from(updated))
    }

    async fn delete_product(&self, id: ProductId) -> EmporiumResult<()> {
        debug!("Deleting product: {}", id);

        if !self.products.delete(id).await? {
            return Err(EmporiumError::not_found("Product", id));
        }
        self.after_product_write(id).await;
        // The store drops the product's cart lines; cached carts may still hold them.
        let dropped = self.cache.invalidate_all_carts().await;
        debug!("Dropped {} cached carts after product {} was deleted", dropped, id);

        info!("Product deleted: {}", id);
        Ok(())
    }

    async fn list_categories(&self) -> EmporiumResult<Vec<CategoryResponse>> {
        debug!("Listing categories");
        let categories = Arc::clone(&self.categories);
        let all = self
            .cache
            .all_categories(|| async move { categories.find_all().await })
            .await?;
        Ok(all.into_iter().map(CategoryResponse::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> EmporiumResult<CategoryResponse> {
        debug!("Getting category: {}", id);
        Ok(CategoryResponse::from(self.load_category(id).await?))
    }

    async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> EmporiumResult<CategoryResponse> {
        debug!("Creating category: {}", request.name);
        request.validate_request()?;

        let name = request.name.trim();
        self.ensure_category_name_free(name, None).await?;

        let saved = self
            .categories
            .save(&Category::new(name, request.description))
            .await?;
        self.after_category_write(None).await;

        info!("Category created: {}", saved.id);
        Ok(CategoryResponse::from(saved))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        request: UpdateCategoryRequest,
    ) -> EmporiumResult<CategoryResponse> {
        debug!("Updating category: {}", id);
        request.validate_request()?;

        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| EmporiumError::not_found("Category", id))?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            self.ensure_category_name_free(&name, Some(id)).await?;
            category.name = name;
        }
        if request.description.is_some() {
            category.description = request.description;
        }

        let updated = self.categories.update(&category).await?;
        self.after_category_write(Some(id)).await;

        info!("Category updated: {}", id);
        Ok(CategoryResponse::from(updated))
    }

    async fn delete_category(&self, id: CategoryId) -> EmporiumResult<()> {
        debug!("Deleting category: {}", id);

        if !self.categories.delete(id).await? {
            return Err(EmporiumError::not_found("Category", id));
        }
        self.after_category_write(Some(id)).await;

        info!("Category deleted: {}", id);
        Ok(())
    }
}
