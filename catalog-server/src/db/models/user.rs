//! User Model

use serde::{Deserialize, Serialize};
use shared::client::UserInfo;

/// Registered API user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "uid")]
    pub id: String,
    pub username: String,
    /// argon2 PHC string
    pub hash_pass: String,
    pub created_at: i64,
}

impl User {
    pub fn new(username: impl Into<String>, hash_pass: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            hash_pass: hash_pass.into(),
            created_at: shared::util::now_millis(),
        }
    }

    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}
