//! Bulk Reconciliation
//!
//! `POST /products` 的核心流程：
//!
//! 1. 归一化：单个对象或数组 → 有序条目列表
//! 2. 逐条解码 + 校验，失败记录为 [`EntryError`]
//! 3. 按 [`BatchPolicy`] 决定是否继续
//! 4. 合法条目转为 [`UpsertOp`]，一次性提交 `bulk_upsert`
//!
//! 库存是增量语义：同一 codigo 重复提交会累加 stock。

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use shared::models::{BatchResult, EntryError, ProductInput};

use super::validation::validate_product;
use crate::db::models::UpsertOp;
use crate::db::repository::{ProductStore, RepoError};
use crate::utils::{AppError, AppResult, ErrorCode};

/// How a batch with invalid entries is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Apply the valid entries, report the invalid ones
    #[default]
    SkipInvalid,
    /// Any invalid entry aborts the whole batch
    RejectAll,
}

impl BatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPolicy::SkipInvalid => "skip_invalid",
            BatchPolicy::RejectAll => "reject_all",
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip_invalid" => Ok(BatchPolicy::SkipInvalid),
            "reject_all" => Ok(BatchPolicy::RejectAll),
            other => Err(format!(
                "unknown batch policy '{other}', expected skip_invalid or reject_all"
            )),
        }
    }
}

/// Normalize a request body into an ordered list of raw entries
pub fn normalize_batch(body: Value) -> AppResult<Vec<Value>> {
    match body {
        Value::Object(_) => Ok(vec![body]),
        Value::Array(entries) if entries.is_empty() => {
            Err(AppError::validation("At least one product is required"))
        }
        Value::Array(entries) => Ok(entries),
        _ => Err(AppError::validation(
            "Request body must be a product object or an array of products",
        )),
    }
}

/// Validated operations plus the per-entry failures
#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub ops: Vec<UpsertOp>,
    pub errors: Vec<EntryError>,
}

/// Decode and validate every entry independently
pub fn prepare_batch(entries: Vec<Value>) -> PreparedBatch {
    let mut batch = PreparedBatch::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let codigo = entry
            .get("codigo")
            .and_then(Value::as_str)
            .map(|c| c.trim().to_string());

        let result = serde_json::from_value::<ProductInput>(entry)
            .map_err(|e| e.to_string())
            .and_then(|input| validate_product(input).map_err(|e| e.message));

        match result {
            Ok(draft) => batch.ops.push(UpsertOp::from_draft(draft)),
            Err(message) => batch.errors.push(EntryError {
                index,
                codigo,
                message,
            }),
        }
    }

    batch
}

/// Run the full reconciliation of one request body
pub async fn reconcile(
    store: &dyn ProductStore,
    body: Value,
    policy: BatchPolicy,
) -> AppResult<BatchResult> {
    let entries = normalize_batch(body)?;
    let total = entries.len();
    let PreparedBatch { ops, errors } = prepare_batch(entries);

    tracing::info!(
        total,
        valid = ops.len(),
        invalid = errors.len(),
        policy = %policy,
        "Reconciling product batch"
    );

    if policy == BatchPolicy::RejectAll && !errors.is_empty() {
        return Err(batch_error(errors, 0, 0));
    }

    let (inserted, modified) = if ops.is_empty() {
        (0, 0)
    } else {
        let written = store.bulk_upsert(ops).await.map_err(|e| match e {
            // 存储拒绝整批 (如库存溢出)，未写入任何条目
            RepoError::Validation(message) => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("insertedCount", 0)
                    .with_detail("modifiedCount", 0)
            }
            other => AppError::with_message(
                ErrorCode::InternalError,
                format!("Failed to apply product batch: {other}"),
            ),
        })?;
        (written.inserted_count, written.modified_count)
    };

    tracing::info!(inserted, modified, "Product batch applied");

    if !errors.is_empty() {
        return Err(batch_error(errors, inserted, modified));
    }
    Ok(BatchResult::ok(inserted, modified))
}

fn batch_error(errors: Vec<EntryError>, inserted: u64, modified: u64) -> AppError {
    let message = format!("{} product(s) failed validation", errors.len());
    AppError::with_message(ErrorCode::ValidationFailed, message)
        .with_detail("errors", serde_json::to_value(errors).unwrap_or_default())
        .with_detail("insertedCount", inserted)
        .with_detail("modifiedCount", modified)
}
