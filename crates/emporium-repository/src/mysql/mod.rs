//! MySQL repository implementations.
//!
//! UUIDs are stored as `CHAR(36)`, money as `DECIMAL`.

mod cart_repository;
mod category_repository;
mod order_repository;
mod product_repository;
mod user_repository;

pub use cart_repository::MySqlCartRepository;
pub use category_repository::MySqlCategoryRepository;
pub use order_repository::MySqlOrderRepository;
pub use product_repository::MySqlProductRepository;
pub use user_repository::MySqlUserRepository;

use emporium_core::EmporiumError;
use uuid::Uuid;

/// Parses a `CHAR(36)` id column into a typed id.
pub(crate) fn parse_id<T: From<Uuid>>(value: &str) -> Result<T, EmporiumError> {
    Uuid::parse_str(value)
        .map(T::from)
        .map_err(|e| EmporiumError::Internal(format!("Invalid UUID in database: {e}")))
}
