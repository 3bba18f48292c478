use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::{ApiResponse, UserCreatedResponse, UserDetailResponse};
use crate::error::{AppError, AppResult};
use crate::models::user::{User, UserActivityCounts};
use crate::validation::{validate_create_user, validate_user_path};
use crate::AppState;

/// 404 with `message` unless the user row exists.
pub async fn ensure_user_exists(db: &PgPool, user_id: Uuid, message: &str) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(AppError::NotFound(message.into()));
    }
    Ok(())
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> AppResult<(StatusCode, ApiResponse<UserCreatedResponse>)> {
    validate_create_user(body.as_ref().map(|Json(v)| v))?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id)
        VALUES ($1)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id = %user.id, "Created anonymous user");

    Ok(ApiResponse::ok(UserCreatedResponse {
        user_id: user.id,
        created_at: user.created_at,
    })
    .with_status(StatusCode::CREATED))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<ApiResponse<UserDetailResponse>> {
    let user_id = validate_user_path(&raw_id)?;

    let counts = sqlx::query_as::<_, UserActivityCounts>(
        r#"
        SELECT u.id, u.created_at,
            (SELECT COUNT(*) FROM daily_metrics m WHERE m.user_id = u.id) AS metrics_count,
            (SELECT COUNT(*) FROM ai_insights i WHERE i.user_id = u.id) AS insights_count
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::ok(UserDetailResponse {
        user_id: counts.id,
        created_at: counts.created_at,
        metrics_count: counts.metrics_count,
        insights_count: counts.insights_count,
    }))
}
