//! Product API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /products | GET | 全部商品 (按 codigo 排序) |
//! | /products | POST | 批量对账 (单个对象或数组) |
//! | /products/all | DELETE | 清空目录 |
//! | /products/{codigo} | GET / PUT / DELETE | 按业务编码操作 |
//! | /products/location/{codigo} | PATCH | 更新存放位置 |
//! | /products/id/{id} | GET / PUT / DELETE | 按内部 id 操作 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/products", get(handler::list).post(handler::reconcile))
        .route("/products/all", delete(handler::delete_all))
        .route(
            "/products/{codigo}",
            get(handler::get_by_codigo)
                .put(handler::replace_by_codigo)
                .delete(handler::delete_by_codigo),
        )
        .route(
            "/products/location/{codigo}",
            patch(handler::update_location),
        )
        .route(
            "/products/id/{id}",
            get(handler::get_by_id)
                .put(handler::replace_by_id)
                .delete(handler::delete_by_id),
        )
}
