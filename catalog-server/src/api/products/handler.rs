//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;
use shared::models::{BatchResult, DeleteResult, LocationUpdate, Product, ProductInput};

use crate::catalog::{self, validate_product};
use crate::core::ServerState;
use crate::db::models::ProductDraft;
use crate::db::repository::RepoError;
use crate::utils::error::{Resource, repo_error};
use crate::utils::validation::{MAX_LOCATION_LEN, validate_text_len};
use crate::utils::{AppError, AppResult, ErrorCode};

fn product_error(err: RepoError) -> AppError {
    repo_error(Resource::Product, err)
}

fn not_found(key: &str) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", key))
}

// =============================================================================
// Collection
// =============================================================================

/// GET /products - 获取所有商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.products.list_all().await.map_err(product_error)?;
    Ok(Json(products))
}

/// POST /products - 批量对账
///
/// 请求体为单个商品或商品数组；库存为增量。
pub async fn reconcile(
    State(state): State<ServerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BatchResult>> {
    let Json(body) = payload?;
    let result =
        catalog::reconcile(state.products.as_ref(), body, state.config.batch_policy).await?;
    Ok(Json(result))
}

/// DELETE /products/all - 清空目录
pub async fn delete_all(State(state): State<ServerState>) -> AppResult<Json<DeleteResult>> {
    let deleted_count = state.products.delete_all().await.map_err(product_error)?;
    if deleted_count == 0 {
        return Err(AppError::new(ErrorCode::CatalogEmpty));
    }

    tracing::info!(deleted_count, "Catalog cleared");
    Ok(Json(DeleteResult {
        deleted_count,
        product: None,
    }))
}

// =============================================================================
// By business code
// =============================================================================

/// GET /products/{codigo}
pub async fn get_by_codigo(
    State(state): State<ServerState>,
    Path(codigo): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .products
        .find_by_codigo(&codigo)
        .await
        .map_err(product_error)?
        .ok_or_else(|| not_found(&codigo))?;
    Ok(Json(product))
}

/// PUT /products/{codigo} - 整体替换 (库存为绝对值)
///
/// 请求体的 codigo 为空时沿用路径值；不为空时必须与路径一致。
pub async fn replace_by_codigo(
    State(state): State<ServerState>,
    Path(codigo): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Json(mut input) = payload?;

    let body_codigo = input.codigo.as_deref().unwrap_or_default().trim().to_string();
    if body_codigo.is_empty() {
        input.codigo = Some(codigo.clone());
    } else if body_codigo != codigo {
        return Err(AppError::validation(format!(
            "codigo '{}' does not match path '{}'",
            body_codigo, codigo
        ))
        .with_detail("field", "codigo"));
    }

    let draft = validate_product(input)?;
    let product = state
        .products
        .replace_by_codigo(&codigo, draft)
        .await
        .map_err(product_error)?;

    tracing::info!(codigo = %product.codigo, stock = product.stock, "Product replaced");
    Ok(Json(product))
}

/// DELETE /products/{codigo}
pub async fn delete_by_codigo(
    State(state): State<ServerState>,
    Path(codigo): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let product = state
        .products
        .delete_by_codigo(&codigo)
        .await
        .map_err(product_error)?;

    tracing::info!(codigo = %product.codigo, "Product deleted");
    Ok(Json(DeleteResult {
        deleted_count: 1,
        product: Some(product),
    }))
}

/// PATCH /products/location/{codigo} - 只更新 ubicacion
pub async fn update_location(
    State(state): State<ServerState>,
    Path(codigo): Path<String>,
    payload: Result<Json<LocationUpdate>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Json(update) = payload?;
    let ubicacion = update
        .ubicacion
        .map(|u| u.trim().to_string())
        .ok_or_else(|| AppError::required_field("ubicacion"))?;
    validate_text_len(&ubicacion, "ubicacion", MAX_LOCATION_LEN)?;

    let product = state
        .products
        .update_location(&codigo, &ubicacion)
        .await
        .map_err(product_error)?;
    Ok(Json(product))
}

// =============================================================================
// By internal id
// =============================================================================

/// GET /products/id/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .products
        .find_by_id(&id)
        .await
        .map_err(product_error)?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(product))
}

/// PUT /products/id/{id} - 整体替换，可修改 codigo
pub async fn replace_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Json(input) = payload?;
    let draft: ProductDraft = validate_product(input)?;
    let product = state
        .products
        .replace_by_id(&id, draft)
        .await
        .map_err(product_error)?;

    tracing::info!(id = %product.id, codigo = %product.codigo, "Product replaced");
    Ok(Json(product))
}

/// DELETE /products/id/{id}
pub async fn delete_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let product = state
        .products
        .delete_by_id(&id)
        .await
        .map_err(product_error)?;

    tracing::info!(id = %product.id, codigo = %product.codigo, "Product deleted");
    Ok(Json(DeleteResult {
        deleted_count: 1,
        product: Some(product),
    }))
}
