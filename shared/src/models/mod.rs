//! Data models
//!
//! Shared between catalog-server and its clients (via API).

pub mod product;

// Re-exports
pub use product::*;
