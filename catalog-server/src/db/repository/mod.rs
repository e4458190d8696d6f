//! Repository Module
//!
//! 商品与用户的存储抽象。处理器只依赖 [`ProductStore`] / [`UserStore`]
//! 两个 trait，具体实现通过 `ServerState` 注入：
//!
//! - [`SurrealProductStore`] / [`SurrealUserStore`]: SurrealDB 文档存储
//! - [`MemoryProductStore`] / [`MemoryUserStore`]: 进程内实现（测试与 `DATABASE_URL=memory`）

pub mod memory;
pub mod product;
pub mod user;

pub use memory::{MemoryProductStore, MemoryUserStore};
pub use product::SurrealProductStore;
pub use user::SurrealUserStore;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::Product;
use thiserror::Error;

use crate::db::models::{BulkWriteResult, ProductDraft, UpsertOp, User};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // 唯一索引冲突: "Database index `product_codigo` already contains ..."
        if message.contains("already contains") || message.contains("already exists") {
            RepoError::Duplicate(message)
        } else {
            RepoError::Database(message)
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("Serialization failed: {}", err))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Catalog store contract
///
/// 所有操作直接透传到底层存储，没有缓存层。
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by codigo
    async fn list_all(&self) -> RepoResult<Vec<Product>>;

    async fn find_by_codigo(&self, codigo: &str) -> RepoResult<Option<Product>>;

    /// Fails with [`RepoError::InvalidId`] when `id` is not a UUID
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>>;

    /// Insert a new product, the store assigns id and timestamps
    async fn insert(&self, draft: ProductDraft) -> RepoResult<Product>;

    /// Snapshot replace of the record keyed by `codigo`
    async fn replace_by_codigo(&self, codigo: &str, draft: ProductDraft) -> RepoResult<Product>;

    /// Snapshot replace of the record keyed by internal id (may change codigo)
    async fn replace_by_id(&self, id: &str, draft: ProductDraft) -> RepoResult<Product>;

    async fn update_location(&self, codigo: &str, ubicacion: &str) -> RepoResult<Product>;

    async fn delete_by_codigo(&self, codigo: &str) -> RepoResult<Product>;

    async fn delete_by_id(&self, id: &str) -> RepoResult<Product>;

    /// Returns the number of deleted records
    async fn delete_all(&self) -> RepoResult<u64>;

    /// Apply upsert operations in order: insert if codigo is unseen,
    /// otherwise merge descriptive fields and increment stock
    async fn bulk_upsert(&self, ops: Vec<UpsertOp>) -> RepoResult<BulkWriteResult>;

    /// Connectivity check
    async fn ping(&self) -> RepoResult<()>;
}

/// User store contract
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Fails with [`RepoError::Duplicate`] when the username is taken
    async fn create(&self, user: User) -> RepoResult<User>;
}

/// Parse and normalize an internal id (UUID v4 string)
pub fn parse_id(id: &str) -> RepoResult<String> {
    uuid::Uuid::parse_str(id.trim())
        .map(|u| u.to_string())
        .map_err(|_| RepoError::InvalidId(format!("'{}' is not a valid id", id)))
}

/// Check that applying `ops` in order keeps every stock within `i64`
///
/// `current` returns the stored stock of a codigo that already exists.
pub(crate) fn check_stock_deltas(
    ops: &[UpsertOp],
    current: impl Fn(&str) -> Option<i64>,
) -> RepoResult<()> {
    let mut running: HashMap<&str, i64> = HashMap::new();
    for op in ops {
        let codigo = op.codigo();
        let base = match running.get(codigo) {
            Some(stock) => *stock,
            None => current(codigo).unwrap_or(0),
        };
        let next = base.checked_add(op.inc_stock).ok_or_else(|| {
            RepoError::Validation(format!("Stock of product '{}' is out of range", codigo))
        })?;
        running.insert(codigo, next);
    }
    Ok(())
}

/// Serialize an entity for the document store: `id` is kept as field `uid`,
/// the record key carries the same value
pub(crate) fn to_document<T: Serialize>(value: &T) -> RepoResult<serde_json::Value> {
    let mut doc = serde_json::to_value(value)?;
    if let serde_json::Value::Object(map) = &mut doc
        && let Some(id) = map.remove("id")
    {
        map.insert("uid".to_string(), id);
    }
    Ok(doc)
}
