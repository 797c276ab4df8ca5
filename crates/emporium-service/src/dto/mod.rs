//! Data transfer objects for the service layer.

mod cache_dto;
mod cart_dto;
mod catalog_dto;
mod order_dto;
mod user_dto;

pub use cache_dto::*;
pub use cart_dto::*;
pub use catalog_dto::*;
pub use order_dto::*;
pub use user_dto::*;
