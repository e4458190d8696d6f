//! Database Module
//!
//! SurrealDB 连接与表结构定义，以及存储实现的选择。
//!
//! `DATABASE_URL` 决定引擎：
//!
//! | 值 | 引擎 |
//! |----|------|
//! | `memory` | 进程内存储 (非 SurrealDB) |
//! | `mem://` | SurrealDB 内存引擎 |
//! | `rocksdb://<path>` | SurrealDB 嵌入式 RocksDB |
//! | `ws://host:port` | 远程 SurrealDB |

pub mod models;
pub mod repository;

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;

use crate::core::config::DatabaseConfig;
use repository::{
    MemoryProductStore, MemoryUserStore, ProductStore, RepoError, RepoResult, SurrealProductStore,
    SurrealUserStore, UserStore,
};

/// Table and index definitions, applied on every start
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
DEFINE INDEX IF NOT EXISTS product_codigo ON TABLE product FIELDS codigo UNIQUE;
DEFINE INDEX IF NOT EXISTS product_uid ON TABLE product FIELDS uid UNIQUE;
DEFINE TABLE IF NOT EXISTS app_user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS app_user_username ON TABLE app_user FIELDS username UNIQUE;
"#;

/// Database service - owns a SurrealDB connection
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Any>,
}

impl DbService {
    /// Connect, select namespace/database and apply the schema
    pub async fn connect(config: &DatabaseConfig) -> RepoResult<Self> {
        let db = any::connect(config.url.as_str()).await?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        let service = Self { db };
        service.apply_schema().await?;

        tracing::info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Database connection established"
        );
        Ok(service)
    }

    async fn apply_schema(&self) -> RepoResult<()> {
        self.db.query(SCHEMA).await?.check()?;
        Ok(())
    }
}

/// Injected store handles
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Process-local stores
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(MemoryProductStore::new()),
            users: Arc::new(MemoryUserStore::new()),
        }
    }

    /// Open the stores selected by the database URL
    pub async fn open(config: &DatabaseConfig) -> RepoResult<Self> {
        if config.is_memory() {
            tracing::warn!("DATABASE_URL=memory, catalog data is not persisted");
            return Ok(Self::in_memory());
        }

        if let Some(path) = config.url.strip_prefix("rocksdb://")
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                RepoError::Database(format!("Failed to create database directory: {}", e))
            })?;
        }

        let service = DbService::connect(config).await?;
        Ok(Self {
            products: Arc::new(SurrealProductStore::new(service.db.clone())),
            users: Arc::new(SurrealUserStore::new(service.db)),
        })
    }
}
