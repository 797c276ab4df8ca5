//! # Emporium Config
//!
//! Layered configuration from TOML files and `EMPORIUM__` environment
//! variables.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
