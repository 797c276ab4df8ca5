//! # Emporium Server
//!
//! Composition root: picks the durable store and the cache backend from
//! configuration, wires the services, and exposes the operator CLI.

pub mod app;
pub mod cli;
pub mod startup;
