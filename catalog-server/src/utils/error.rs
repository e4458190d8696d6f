//! 统一错误处理
//!
//! 错误类型统一来自 `shared::error`，这里补充存储层错误到 [`AppError`] 的映射。
//! 同一个 [`RepoError`] 按来源存储映射到不同的业务错误码：
//!
//! | RepoError | Product | User | HTTP |
//! |-----------|---------|------|------|
//! | NotFound | ProductNotFound | NotFound | 404 |
//! | Duplicate | ProductCodeExists | UsernameExists | 409 |
//! | InvalidId | InvalidProductId | ValidationFailed | 400 |
//! | Validation | ValidationFailed | ValidationFailed | 400 |
//! | Database | DatabaseError | DatabaseError | 500 |

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;

/// 存储错误的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    User,
}

/// 存储错误 → 应用错误
pub fn repo_error(resource: Resource, err: RepoError) -> AppError {
    match (resource, err) {
        (Resource::Product, RepoError::NotFound(msg)) => {
            AppError::with_message(ErrorCode::ProductNotFound, msg)
        }
        (Resource::Product, RepoError::Duplicate(msg)) => {
            AppError::with_message(ErrorCode::ProductCodeExists, msg)
        }
        (Resource::Product, RepoError::InvalidId(msg)) => {
            AppError::with_message(ErrorCode::InvalidProductId, msg)
        }
        (Resource::User, RepoError::NotFound(msg)) => {
            AppError::with_message(ErrorCode::NotFound, msg)
        }
        (Resource::User, RepoError::Duplicate(msg)) => {
            AppError::with_message(ErrorCode::UsernameExists, msg)
        }
        (Resource::User, RepoError::InvalidId(msg)) | (_, RepoError::Validation(msg)) => {
            AppError::validation(msg)
        }
        (_, RepoError::Database(msg)) => AppError::database(msg),
    }
}
