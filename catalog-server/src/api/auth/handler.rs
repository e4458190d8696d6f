//! Authentication Handlers
//!
//! Handles registration, login and token refresh

use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::models::User;
use crate::utils::error::{Resource, repo_error};
use crate::utils::validation::{
    MAX_PASSWORD_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};
use crate::utils::{AppError, ErrorCode};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 300;

fn issue_token(state: &ServerState, user: UserInfo) -> Result<LoginResponse, AppError> {
    let token = state
        .get_jwt_service()
        .generate_token(&user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;
    Ok(LoginResponse { token, user })
}

/// Register handler
///
/// Creates a user and returns a token for it
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let username = req.username.trim().to_string();

    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters"),
        )
        .with_detail("field", "username"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if req.password.chars().count() > MAX_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("password must be at most {MAX_PASSWORD_LEN} characters"),
        )
        .with_detail("field", "password"));
    }

    let hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let user = state
        .users
        .create(User::new(username, hash))
        .await
        .map_err(|e| repo_error(Resource::User, e))?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(issue_token(&state, user.info())?))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let username = req.username.trim().to_string();

    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|e| repo_error(Resource::User, e))?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let user = match user {
        Some(u) if verify_password(&req.password, &u.hash_pass) => u,
        Some(_) => {
            crate::security_log!(
                "WARN",
                "login_failed",
                username = username.clone(),
                reason = "invalid_password"
            );
            return Err(AppError::invalid_credentials());
        }
        None => {
            crate::security_log!(
                "WARN",
                "login_failed",
                username = username.clone(),
                reason = "user_not_found"
            );
            return Err(AppError::invalid_credentials());
        }
    };

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User logged in successfully"
    );

    Ok(Json(issue_token(&state, user.info())?))
}

/// Token refresh handler
///
/// Requires a currently valid bearer token, returns a fresh one
pub async fn refresh_token(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<LoginResponse>, AppError> {
    let info = UserInfo {
        id: user.id,
        username: user.username,
    };
    tracing::debug!(user_id = %info.id, "Token refreshed");
    Ok(Json(issue_token(&state, info)?))
}
