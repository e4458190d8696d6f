//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、令牌刷新
//! - [`products`] - 商品目录与批量对账

pub mod auth;
pub mod health;
pub mod products;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::middleware::logging_middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Auth API - public route
        .merge(auth::router())
        // Product API - authentication required
        .merge(products::router())
}

/// Build a fully configured application with all middleware
///
/// 后添加的层在外侧。请求依次经过：
/// CORS → Request ID → Compression → Trace → 请求日志 → JWT 认证 → 路由，
/// 因此认证失败的 401/403 同样带有 CORS 头和 x-request-id，并被记录日志。
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Application Middleware ==========
        // JWT authentication - innermost, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        // Request logging
        .layer(axum_middleware::from_fn(logging_middleware))
        // ========== Tower HTTP Middleware ==========
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Request ID - Generate unique ID for each request (must wrap Propagate)
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        // CORS - outermost, so every response (auth errors included) carries CORS headers
        .layer(cors_layer(&state.config.allowed_origins))
}

/// CORS: 未配置来源时放行所有来源
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
