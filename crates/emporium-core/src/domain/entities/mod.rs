//! Domain entities.

mod cart;
mod category;
mod order;
mod product;
mod user;

pub use cart::*;
pub use category::*;
pub use order::*;
pub use product::*;
pub use user::*;
