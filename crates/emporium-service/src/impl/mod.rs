//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `cart_service.rs`).

pub mod cache_admin_service_impl;
pub mod cart_service_impl;
pub mod catalog_service_impl;
pub mod checkout_service_impl;
pub mod user_service_impl;

pub use cache_admin_service_impl::CacheAdminServiceImpl;
pub use cart_service_impl::CartServiceImpl;
pub use catalog_service_impl::CatalogServiceImpl;
pub use checkout_service_impl::{CheckoutRepositories, CheckoutServiceImpl};
pub use user_service_impl::UserServiceImpl;
