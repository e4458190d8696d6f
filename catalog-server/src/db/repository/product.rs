//! Product Repository (SurrealDB)

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use shared::models::Product;
use shared::util::now_millis;
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Surreal};

use super::{ProductStore, RepoError, RepoResult, check_stock_deltas, parse_id, to_document};
use crate::db::models::{BulkWriteResult, ProductDraft, UpsertOp};

const TABLE: &str = "product";

#[derive(Debug, Deserialize)]
struct StockRow {
    codigo: String,
    #[serde(default)]
    stock: i64,
}

#[derive(Clone)]
pub struct SurrealProductStore {
    db: Surreal<Any>,
    /// 序列化 "先查后写" 的操作 (插入、替换、批量对账)，防止同一 codigo 并发 CREATE
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SurrealProductStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn record(id: &str) -> RecordId {
        RecordId::from_table_key(TABLE, id)
    }

    fn not_found(key: &str) -> RepoError {
        RepoError::NotFound(format!("Product {} not found", key))
    }

    /// Write a full record (create or snapshot replace)
    async fn write_content(&self, statement: &str, product: &Product) -> RepoResult<()> {
        let doc = to_document(product)?;
        self.db
            .query(statement)
            .bind(("thing", Self::record(&product.id)))
            .bind(("data", doc))
            .await?
            .check()?;
        Ok(())
    }

    async fn ensure_codigo_free(&self, codigo: &str, owner_id: &str) -> RepoResult<()> {
        if let Some(other) = self.find_by_codigo(codigo).await?
            && other.id != owner_id
        {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                codigo
            )));
        }
        Ok(())
    }

    async fn replace(&self, existing: Product, draft: ProductDraft) -> RepoResult<Product> {
        if draft.codigo != existing.codigo {
            self.ensure_codigo_free(&draft.codigo, &existing.id).await?;
        }
        let product = draft.into_product(existing.id, existing.created_at, now_millis());
        self.write_content("UPDATE $thing CONTENT $data RETURN NONE", &product)
            .await?;
        Ok(product)
    }

    async fn remove(&self, product: Product) -> RepoResult<Product> {
        self.db
            .query("DELETE $thing")
            .bind(("thing", Self::record(&product.id)))
            .await?
            .check()?;
        Ok(product)
    }
}

#[async_trait]
impl ProductStore for SurrealProductStore {
    async fn list_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .db
            .query("SELECT * OMIT id FROM product ORDER BY codigo ASC")
            .await?
            .take(0)?;
        Ok(products)
    }

    async fn find_by_codigo(&self, codigo: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .db
            .query("SELECT * OMIT id FROM product WHERE codigo = $codigo LIMIT 1")
            .bind(("codigo", codigo.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let id = parse_id(id)?;
        let mut result = self
            .db
            .query("SELECT * OMIT id FROM $thing")
            .bind(("thing", Self::record(&id)))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    async fn insert(&self, draft: ProductDraft) -> RepoResult<Product> {
        let _guard = self.write_lock.lock().await;

        // Check duplicate codigo
        if self.find_by_codigo(&draft.codigo).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                draft.codigo
            )));
        }

        let now = now_millis();
        let product = draft.into_product(uuid::Uuid::new_v4().to_string(), now, now);
        self.write_content("CREATE $thing CONTENT $data RETURN NONE", &product)
            .await?;
        Ok(product)
    }

    async fn replace_by_codigo(&self, codigo: &str, draft: ProductDraft) -> RepoResult<Product> {
        let _guard = self.write_lock.lock().await;
        let existing = self
            .find_by_codigo(codigo)
            .await?
            .ok_or_else(|| Self::not_found(codigo))?;
        self.replace(existing, draft).await
    }

    async fn replace_by_id(&self, id: &str, draft: ProductDraft) -> RepoResult<Product> {
        let _guard = self.write_lock.lock().await;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.replace(existing, draft).await
    }

    async fn update_location(&self, codigo: &str, ubicacion: &str) -> RepoResult<Product> {
        let mut product = self
            .find_by_codigo(codigo)
            .await?
            .ok_or_else(|| Self::not_found(codigo))?;

        let now = now_millis();
        self.db
            .query("UPDATE $thing SET ubicacion = $ubicacion, updatedAt = $now RETURN NONE")
            .bind(("thing", Self::record(&product.id)))
            .bind(("ubicacion", ubicacion.to_string()))
            .bind(("now", now))
            .await?
            .check()?;

        product.ubicacion = ubicacion.to_string();
        product.updated_at = now;
        Ok(product)
    }

    async fn delete_by_codigo(&self, codigo: &str) -> RepoResult<Product> {
        let product = self
            .find_by_codigo(codigo)
            .await?
            .ok_or_else(|| Self::not_found(codigo))?;
        self.remove(product).await
    }

    async fn delete_by_id(&self, id: &str) -> RepoResult<Product> {
        let product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.remove(product).await
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut result = self
            .db
            .query("SELECT VALUE uid FROM product; DELETE product RETURN NONE;")
            .await?
            .check()?;
        let ids: Vec<String> = result.take(0)?;
        Ok(ids.len() as u64)
    }

    async fn bulk_upsert(&self, ops: Vec<UpsertOp>) -> RepoResult<BulkWriteResult> {
        let mut result = BulkWriteResult::default();
        if ops.is_empty() {
            return Ok(result);
        }

        // 查询与写入之间不允许其它写操作插入
        let _guard = self.write_lock.lock().await;

        let codigos: Vec<String> = ops.iter().map(|op| op.codigo().to_string()).collect();
        let existing: Vec<StockRow> = self
            .db
            .query("SELECT codigo, stock FROM product WHERE codigo IN $codigos")
            .bind(("codigos", codigos))
            .await?
            .take(0)?;
        let mut known: HashMap<String, i64> = existing
            .into_iter()
            .map(|row| (row.codigo, row.stock))
            .collect();
        check_stock_deltas(&ops, |codigo| known.get(codigo).copied())?;

        // 一次多语句写入，按顺序执行；同一批次内重复的 codigo 会走更新分支
        let now = now_millis();
        let mut sql = String::new();
        let mut bindings: Vec<(String, serde_json::Value)> = Vec::new();
        for (i, op) in ops.into_iter().enumerate() {
            if known.contains_key(op.codigo()) {
                sql.push_str(&format!(
                    "UPDATE product MERGE $set{i} WHERE codigo = $codigo{i} RETURN NONE;\n\
                     UPDATE product SET stock += $inc{i} WHERE codigo = $codigo{i} RETURN NONE;\n"
                ));
                bindings.push((format!("set{i}"), op.set.merge_document(now)?));
                bindings.push((format!("codigo{i}"), op.codigo().into()));
                bindings.push((format!("inc{i}"), op.inc_stock.into()));
                result.modified_count += 1;
            } else {
                let UpsertOp { mut set, inc_stock } = op;
                set.stock = inc_stock;
                known.insert(set.codigo.clone(), inc_stock);
                let id = uuid::Uuid::new_v4().to_string();
                let product = set.into_product(id.clone(), now, now);
                sql.push_str(&format!(
                    "CREATE type::thing('product', $uid{i}) CONTENT $doc{i} RETURN NONE;\n"
                ));
                bindings.push((format!("uid{i}"), id.into()));
                bindings.push((format!("doc{i}"), to_document(&product)?));
                result.inserted_count += 1;
            }
        }

        let mut query = self.db.query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }
        query.await?.check()?;

        tracing::debug!(
            inserted = result.inserted_count,
            modified = result.modified_count,
            "Bulk upsert applied"
        );
        Ok(result)
    }

    async fn ping(&self) -> RepoResult<()> {
        self.db.health().await?;
        Ok(())
    }
}
