//! # Emporium Repository
//!
//! Durable store contracts and their implementations:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ProductRepository> (and friends)
//! MySql*Repository  |  InMemoryStore
//!   ↓
//! MySQL (SQLx)      |  process memory
//! ```

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use memory::InMemoryStore;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
