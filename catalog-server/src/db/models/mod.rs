//! 存储层模型
//!
//! 通用商品结构位于 `shared::models`，这里放只在服务端使用的写入模型。

pub mod product;
pub mod user;

pub use product::{BulkWriteResult, ProductDraft, UpsertOp};
pub use user::User;
