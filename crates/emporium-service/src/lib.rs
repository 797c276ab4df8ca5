//! # Emporium Service
//!
//! Business logic for the catalog, users, carts and checkout, plus the
//! cache-aside layer that sits in front of the repositories.

pub mod cache;
pub mod cache_admin_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod dto;
pub mod r#impl;
pub mod user_service;

pub use cache::*;
pub use cache_admin_service::*;
pub use cart_service::*;
pub use catalog_service::*;
pub use checkout_service::*;
pub use dto::*;
pub use r#impl::*;
pub use user_service::*;
