//! Catalog domain logic
//!
//! - [`validation`]: 单条商品载荷校验与默认值
//! - [`reconcile`]: 批量对账（插入或合并 + 库存累加）

pub mod reconcile;
pub mod validation;

pub use reconcile::{BatchPolicy, PreparedBatch, normalize_batch, prepare_batch, reconcile};
pub use validation::validate_product;
