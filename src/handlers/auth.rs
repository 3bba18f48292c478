use axum::{extract::State, http::StatusCode, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{
    jwt::create_access_token,
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::dto::{AccountSummary, ApiResponse, AuthResponse};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::models::user::User;
use crate::validation::{Credentials, NewAccount};
use crate::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(account): ValidatedJson<NewAccount>,
) -> AppResult<(StatusCode, ApiResponse<AuthResponse>)> {
    let existing = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE email = $1 OR username = $2 LIMIT 1",
    )
    .bind(&account.email)
    .bind(&account.username)
    .fetch_optional(&state.db)
    .await?;

    if let Some(existing) = existing {
        let message = if existing.email.as_deref() == Some(account.email.as_str()) {
            "Email already registered"
        } else {
            "Username already taken"
        };
        return Err(AppError::Conflict(message.into()));
    }

    let pwd_hash = hash_password(&account.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, username, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&account.email)
    .bind(&account.username)
    .bind(&pwd_hash)
    .fetch_one(&state.db)
    .await?;

    let token = create_access_token(user.id, user.email.as_deref(), &state.config)?;
    tracing::info!(user_id = %user.id, "Registered account");

    Ok(ApiResponse::ok(AuthResponse {
        user: user.into(),
        token,
        expires_in: state.config.jwt_ttl_secs,
    })
    .with_status(StatusCode::CREATED))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&credentials.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let stored = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&credentials.password, stored)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(invalid());
    }

    let token = create_access_token(user.id, user.email.as_deref(), &state.config)?;

    Ok(ApiResponse::ok(AuthResponse {
        user: user.into(),
        token,
        expires_in: state.config.jwt_ttl_secs,
    }))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> ApiResponse<Value> {
    tracing::info!(user_id = %auth_user.id, "Logged out");
    ApiResponse::ok(json!({ "message": "Logged out successfully" }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<ApiResponse<AccountSummary>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::ok(user.into()))
}
