//! Shared helpers for the HTTP integration tests
//!
//! The full router (middleware included) runs on in-memory stores and is
//! driven through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use catalog_server::auth::JwtConfig;
use catalog_server::core::DatabaseConfig;
use catalog_server::{BatchPolicy, Config, ServerState, api};
use http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-key-0123456789abcdef";

pub struct TestApp {
    pub state: ServerState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(BatchPolicy::SkipInvalid)
    }

    pub fn with_policy(policy: BatchPolicy) -> Self {
        Self::with_config(|config| config.batch_policy = policy)
    }

    /// Development config on memory stores, adjusted by `f`
    pub fn with_config(f: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::development();
        config.database = DatabaseConfig::memory();
        config.jwt = JwtConfig::with_secret(TEST_SECRET);
        f(&mut config);

        let state = ServerState::in_memory(config);
        let router = api::build_app(&state).with_state(state.clone());
        Self { state, router }
    }

    /// A valid bearer token for a synthetic user
    pub fn token(&self) -> String {
        self.state
            .get_jwt_service()
            .generate_token("00000000-0000-4000-8000-000000000001", "tester")
            .expect("token")
    }

    /// Send a request with an optional bearer token and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    /// Authenticated request
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.token();
        self.request(method, uri, Some(&token), body).await
    }

    /// Send a raw request and keep the full response
    pub async fn send_raw(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a raw request
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send_raw(request).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
