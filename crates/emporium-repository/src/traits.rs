//! Repository trait definitions.

use async_trait::async_trait;
use emporium_core::{
    Cart, CartId, CartItem, Category, CategoryId, EmporiumResult, Order, OrderId, OrderStatus,
    Product, ProductId, User, UserId,
};
use rust_decimal::Decimal;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> EmporiumResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> EmporiumResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> EmporiumResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> EmporiumResult<bool>;

    /// Case-insensitive.
    async fn exists_by_email(&self, email: &str) -> EmporiumResult<bool>;

    /// Inserts a new user. Duplicate username or email is a `Conflict`.
    async fn save(&self, user: &User) -> EmporiumResult<User>;

    async fn update(&self, user: &User) -> EmporiumResult<User>;

    /// Deletes a user together with their cart and orders.
    async fn delete(&self, id: UserId) -> EmporiumResult<bool>;

    async fn count(&self) -> EmporiumResult<u64>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: CategoryId) -> EmporiumResult<Option<Category>>;

    async fn find_by_name(&self, name: &str) -> EmporiumResult<Option<Category>>;

    /// All categories ordered by name.
    async fn find_all(&self) -> EmporiumResult<Vec<Category>>;

    /// Inserts a new category. Duplicate name is a `Conflict`.
    async fn save(&self, category: &Category) -> EmporiumResult<Category>;

    async fn update(&self, category: &Category) -> EmporiumResult<Category>;

    /// Deleting a category that still holds products is a `Conflict`.
    async fn delete(&self, id: CategoryId) -> EmporiumResult<bool>;
}

/// Product repository.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> EmporiumResult<Option<Product>>;

    /// All products, oldest first.
    async fn find_all(&self) -> EmporiumResult<Vec<Product>>;

    async fn find_by_category(&self, category_id: CategoryId) -> EmporiumResult<Vec<Product>>;

    /// Products priced within `[min, max]`.
    async fn find_by_price_range(&self, min: Decimal, max: Decimal)
        -> EmporiumResult<Vec<Product>>;

    /// Case-insensitive substring search over name and description.
    async fn search(&self, term: &str) -> EmporiumResult<Vec<Product>>;

    async fn save(&self, product: &Product) -> EmporiumResult<Product>;

    async fn update(&self, product: &Product) -> EmporiumResult<Product>;

    /// Deletes a product and drops it from every cart.
    async fn delete(&self, id: ProductId) -> EmporiumResult<bool>;
}

/// Cart repository.
///
/// Every item mutation also bumps the cart's `updated_at` in the same
/// transaction.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The owner's cart with its items, if one exists.
    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Option<Cart>>;

    /// Returns the owner's cart, creating an empty one if none exists.
    async fn find_or_create(&self, owner_id: UserId) -> EmporiumResult<Cart>;

    /// Adds `quantity` to the line for `product_id`, inserting it if absent.
    /// Atomic with respect to concurrent callers.
    async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<CartItem>;

    /// Sets the quantity of an existing line. Returns false if absent.
    async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> EmporiumResult<bool>;

    /// Returns false if the line was absent.
    async fn remove_item(&self, cart_id: CartId, product_id: ProductId) -> EmporiumResult<bool>;

    /// Removes every line, keeping the cart. Returns the number removed.
    async fn clear(&self, cart_id: CartId) -> EmporiumResult<u64>;
}

/// Order repository.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and all its items in one transaction.
    async fn create(&self, order: &Order) -> EmporiumResult<Order>;

    async fn find_by_id(&self, id: OrderId) -> EmporiumResult<Option<Order>>;

    /// The owner's orders, newest first.
    async fn find_by_owner(&self, owner_id: UserId) -> EmporiumResult<Vec<Order>>;

    /// Returns false if the order does not exist.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> EmporiumResult<bool>;
}
