use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::dto::ApiResponse;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "med-brain-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "MED-BRAIN API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "user": "/api/user",
            "metrics": "/api/metrics",
            "ai": "/api/ai",
        },
    }))
}

/// The AI service is reported but does not gate readiness: metric logging
/// works without it.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();
    let ai_ok = state.ai.health().await;

    let checks = json!({
        "database": if db_ok { "ok" } else { "failed" },
        "ai_service": if ai_ok { "ok" } else { "unavailable" },
    });

    if db_ok {
        (
            StatusCode::OK,
            Json(json!({ "status": "ready", "checks": checks })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "checks": checks })),
        )
    }
}

pub async fn not_found() -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::NOT_FOUND,
        ApiResponse::failure("Endpoint not found", None),
    )
}
