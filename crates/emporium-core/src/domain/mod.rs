//! # Emporium Domain
//!
//! Domain entities and value objects for the catalog, cart and order
//! aggregates.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
