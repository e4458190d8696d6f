//! Shared types for the catalog service
//!
//! Wire types used by catalog-server and its clients: error codes,
//! response structures, product and auth DTOs.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
