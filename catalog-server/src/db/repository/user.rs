//! User Repository (SurrealDB)

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Surreal};

use super::{RepoError, RepoResult, UserStore, to_document};
use crate::db::models::User;

const TABLE: &str = "app_user";

#[derive(Clone)]
pub struct SurrealUserStore {
    db: Surreal<Any>,
}

impl SurrealUserStore {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SurrealUserStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT * OMIT id FROM app_user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    async fn create(&self, user: User) -> RepoResult<User> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        self.db
            .query("CREATE $thing CONTENT $data RETURN NONE")
            .bind(("thing", RecordId::from_table_key(TABLE, user.id.as_str())))
            .bind(("data", to_document(&user)?))
            .await?
            .check()?;
        Ok(user)
    }
}
