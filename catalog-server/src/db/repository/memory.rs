//! In-memory stores
//!
//! 与 SurrealDB 实现语义一致的进程内存储。锁只在同步代码段内持有，
//! 不跨越 `.await`。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::Product;
use shared::util::now_millis;

use super::{ProductStore, RepoError, RepoResult, UserStore, check_stock_deltas, parse_id};
use crate::db::models::{BulkWriteResult, ProductDraft, UpsertOp, User};

#[derive(Debug, Default)]
struct Catalog {
    /// id -> product
    by_id: HashMap<String, Product>,
    /// codigo -> id (unique index)
    codigo_index: BTreeMap<String, String>,
}

impl Catalog {
    fn get_by_codigo(&self, codigo: &str) -> Option<&Product> {
        self.codigo_index
            .get(codigo)
            .and_then(|id| self.by_id.get(id))
    }

    fn insert_new(&mut self, draft: ProductDraft, now: i64) -> RepoResult<Product> {
        if self.codigo_index.contains_key(&draft.codigo) {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                draft.codigo
            )));
        }
        let id = uuid::Uuid::new_v4().to_string();
        let product = draft.into_product(id.clone(), now, now);
        self.codigo_index.insert(product.codigo.clone(), id.clone());
        self.by_id.insert(id, product.clone());
        Ok(product)
    }

    /// Snapshot replace of an existing record, keeps id and created_at
    fn replace(&mut self, id: &str, draft: ProductDraft, now: i64) -> RepoResult<Product> {
        let existing = self
            .by_id
            .get(id)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        if draft.codigo != existing.codigo
            && let Some(other) = self.codigo_index.get(&draft.codigo)
            && other != id
        {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                draft.codigo
            )));
        }

        let old_codigo = existing.codigo.clone();
        let product = draft.into_product(id.to_string(), existing.created_at, now);

        self.codigo_index.remove(&old_codigo);
        self.codigo_index
            .insert(product.codigo.clone(), id.to_string());
        self.by_id.insert(id.to_string(), product.clone());
        Ok(product)
    }

    fn remove(&mut self, id: &str) -> Option<Product> {
        let product = self.by_id.remove(id)?;
        self.codigo_index.remove(&product.codigo);
        Some(product)
    }
}

/// Process-local product store
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: RwLock<Catalog>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list_all(&self) -> RepoResult<Vec<Product>> {
        let catalog = self.inner.read();
        Ok(catalog
            .codigo_index
            .values()
            .filter_map(|id| catalog.by_id.get(id).cloned())
            .collect())
    }

    async fn find_by_codigo(&self, codigo: &str) -> RepoResult<Option<Product>> {
        Ok(self.inner.read().get_by_codigo(codigo).cloned())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let id = parse_id(id)?;
        Ok(self.inner.read().by_id.get(&id).cloned())
    }

    async fn insert(&self, draft: ProductDraft) -> RepoResult<Product> {
        self.inner.write().insert_new(draft, now_millis())
    }

    async fn replace_by_codigo(&self, codigo: &str, draft: ProductDraft) -> RepoResult<Product> {
        let mut catalog = self.inner.write();
        let id = catalog
            .codigo_index
            .get(codigo)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", codigo)))?;
        catalog.replace(&id, draft, now_millis())
    }

    async fn replace_by_id(&self, id: &str, draft: ProductDraft) -> RepoResult<Product> {
        let id = parse_id(id)?;
        self.inner.write().replace(&id, draft, now_millis())
    }

    async fn update_location(&self, codigo: &str, ubicacion: &str) -> RepoResult<Product> {
        let mut catalog = self.inner.write();
        let id = catalog
            .codigo_index
            .get(codigo)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", codigo)))?;
        let product = catalog
            .by_id
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", codigo)))?;
        product.ubicacion = ubicacion.to_string();
        product.updated_at = now_millis();
        Ok(product.clone())
    }

    async fn delete_by_codigo(&self, codigo: &str) -> RepoResult<Product> {
        let mut catalog = self.inner.write();
        let id = catalog
            .codigo_index
            .get(codigo)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", codigo)))?;
        catalog
            .remove(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", codigo)))
    }

    async fn delete_by_id(&self, id: &str) -> RepoResult<Product> {
        let id = parse_id(id)?;
        self.inner
            .write()
            .remove(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut catalog = self.inner.write();
        let count = catalog.by_id.len() as u64;
        catalog.by_id.clear();
        catalog.codigo_index.clear();
        Ok(count)
    }

    async fn bulk_upsert(&self, ops: Vec<UpsertOp>) -> RepoResult<BulkWriteResult> {
        let mut catalog = self.inner.write();
        check_stock_deltas(&ops, |codigo| catalog.get_by_codigo(codigo).map(|p| p.stock))?;

        let mut result = BulkWriteResult::default();
        let now = now_millis();

        for op in ops {
            match catalog.codigo_index.get(op.codigo()).cloned() {
                Some(id) => {
                    let product = catalog
                        .by_id
                        .get_mut(&id)
                        .ok_or_else(|| RepoError::Database(format!("Dangling index for {}", id)))?;
                    op.set.merge_into(product, now);
                    // 溢出已由 check_stock_deltas 排除
                    product.stock += op.inc_stock;
                    result.modified_count += 1;
                }
                None => {
                    let UpsertOp { mut set, inc_stock } = op;
                    set.stock = inc_stock;
                    catalog.insert_new(set, now)?;
                    result.inserted_count += 1;
                }
            }
        }

        Ok(result)
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(username).cloned())
    }

    async fn create(&self, user: User) -> RepoResult<User> {
        let mut users = self.users.write();
        if users.contains_key(&user.username) {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::product::sample_draft;

    #[tokio::test]
    async fn bulk_upsert_inserts_then_increments() {
        let store = MemoryProductStore::new();

        let first = store
            .bulk_upsert(vec![UpsertOp::from_draft(sample_draft("X", 5))])
            .await
            .unwrap();
        assert_eq!(first.inserted_count, 1);
        assert_eq!(first.modified_count, 0);

        let second = store
            .bulk_upsert(vec![UpsertOp::from_draft(sample_draft("X", 3))])
            .await
            .unwrap();
        assert_eq!(second.inserted_count, 0);
        assert_eq!(second.modified_count, 1);

        let product = store.find_by_codigo("X").await.unwrap().unwrap();
        assert_eq!(product.stock, 8);
    }

    #[tokio::test]
    async fn same_codigo_twice_in_one_batch_accumulates() {
        let store = MemoryProductStore::new();
        let result = store
            .bulk_upsert(vec![
                UpsertOp::from_draft(sample_draft("Y", 2)),
                UpsertOp::from_draft(sample_draft("Y", 4)),
            ])
            .await
            .unwrap();
        assert_eq!(result.inserted_count, 1);
        assert_eq!(result.modified_count, 1);
        assert_eq!(store.find_by_codigo("Y").await.unwrap().unwrap().stock, 6);
    }

    #[tokio::test]
    async fn stock_overflow_rejects_whole_batch() {
        let store = MemoryProductStore::new();
        store
            .bulk_upsert(vec![UpsertOp::from_draft(sample_draft("O", i64::MAX))])
            .await
            .unwrap();

        let err = store
            .bulk_upsert(vec![
                UpsertOp::from_draft(sample_draft("P", 1)),
                UpsertOp::from_draft(sample_draft("O", 1)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        // 整批未写入
        assert!(store.find_by_codigo("P").await.unwrap().is_none());
        assert_eq!(
            store.find_by_codigo("O").await.unwrap().unwrap().stock,
            i64::MAX
        );
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_codigo() {
        let store = MemoryProductStore::new();
        store.insert(sample_draft("D", 1)).await.unwrap();
        let err = store.insert(sample_draft("D", 1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn replace_by_id_can_rename_but_not_collide() {
        let store = MemoryProductStore::new();
        let a = store.insert(sample_draft("A", 1)).await.unwrap();
        store.insert(sample_draft("B", 1)).await.unwrap();

        let renamed = store
            .replace_by_id(&a.id, sample_draft("C", 9))
            .await
            .unwrap();
        assert_eq!(renamed.codigo, "C");
        assert_eq!(renamed.stock, 9);
        assert_eq!(renamed.created_at, a.created_at);
        assert!(store.find_by_codigo("A").await.unwrap().is_none());

        let err = store
            .replace_by_id(&a.id, sample_draft("B", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn list_is_ordered_by_codigo() {
        let store = MemoryProductStore::new();
        for codigo in ["c", "a", "b"] {
            store.insert(sample_draft(codigo, 0)).await.unwrap();
        }
        let codigos: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.codigo)
            .collect();
        assert_eq!(codigos, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn id_operations_validate_format() {
        let store = MemoryProductStore::new();
        assert!(matches!(
            store.find_by_id("123").await,
            Err(RepoError::InvalidId(_))
        ));
        assert!(matches!(
            store.delete_by_id("123").await,
            Err(RepoError::InvalidId(_))
        ));
        let missing = uuid::Uuid::new_v4().to_string();
        assert!(matches!(
            store.delete_by_id(&missing).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_all_reports_count() {
        let store = MemoryProductStore::new();
        assert_eq!(store.delete_all().await.unwrap(), 0);
        store.insert(sample_draft("A", 0)).await.unwrap();
        store.insert(sample_draft("B", 0)).await.unwrap();
        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_store_rejects_duplicate_username() {
        let store = MemoryUserStore::new();
        store.create(User::new("ana", "hash")).await.unwrap();
        let err = store.create(User::new("ana", "hash")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert!(store.find_by_username("ana").await.unwrap().is_some());
    }
}
