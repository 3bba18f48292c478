use std::time::Instant;

use axum::extract::State;
use chrono::{Duration, Utc};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::dto::{ApiResponse, InsightHistoryEntry, InsightHistoryResponse, InsightResponse};
use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::handlers::users::ensure_user_exists;
use crate::models::daily_metric::DailyMetric;
use crate::models::insight::{confidence_level, phase_description, AiInsight, AnalysisPhase};
use crate::validation::{InsightRequest, MetricsHistoryQuery};
use crate::AppState;

/// Days of metrics sent to the AI service per analysis
const ANALYSIS_WINDOW_DAYS: i64 = 30;

fn insight_response(insight: AiInsight, analysis_duration_ms: Option<u64>) -> InsightResponse {
    InsightResponse {
        insight_id: insight.id,
        date: insight.date.date_naive(),
        phase: insight.phase,
        phase_description: phase_description(insight.phase),
        confidence: insight.confidence,
        confidence_level: confidence_level(insight.confidence),
        suggestions: insight.suggestions.0,
        stats: insight.stats.0,
        analysis_duration_ms,
    }
}

pub async fn analyze_metrics(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<InsightRequest>,
) -> AppResult<ApiResponse<InsightResponse>> {
    let started = Instant::now();
    ensure_user_exists(&state.db, request.user_id, "User not found").await?;

    let now = Utc::now();
    let window_start = now.date_naive() - Duration::days(ANALYSIS_WINDOW_DAYS);

    let metrics = sqlx::query_as::<_, DailyMetric>(
        r#"
        SELECT * FROM daily_metrics
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date ASC
        "#,
    )
    .bind(request.user_id)
    .bind(window_start)
    .bind(now.date_naive())
    .fetch_all(&state.db)
    .await?;

    if metrics.is_empty() {
        return Err(AppError::BadRequest(
            "No metrics available for analysis. Please submit daily metrics first.".into(),
        ));
    }

    let estimated = AnalysisPhase::from_days_of_data(metrics.len());
    tracing::info!(
        user_id = %request.user_id,
        days_of_data = metrics.len(),
        estimated_phase = i32::from(estimated),
        "Analyzing metrics"
    );

    let result = state.ai.analyze(request.user_id, &metrics).await?;

    let insight = sqlx::query_as::<_, AiInsight>(
        r#"
        INSERT INTO ai_insights (id, user_id, date, phase, confidence, suggestions, stats)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.user_id)
    .bind(now)
    .bind(i32::from(result.phase))
    .bind(result.confidence)
    .bind(SqlJson(&result.suggestions))
    .bind(SqlJson(&result.stats))
    .fetch_one(&state.db)
    .await?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        user_id = %request.user_id,
        insight_id = %insight.id,
        phase = insight.phase,
        confidence = insight.confidence,
        duration_ms = elapsed_ms,
        "Stored AI insight"
    );

    Ok(ApiResponse::ok(insight_response(insight, Some(elapsed_ms))))
}

pub async fn latest_insight(
    State(state): State<AppState>,
    ValidatedQuery(request): ValidatedQuery<InsightRequest>,
) -> AppResult<ApiResponse<InsightResponse>> {
    ensure_user_exists(&state.db, request.user_id, "User not found").await?;

    let insight = sqlx::query_as::<_, AiInsight>(
        r#"
        SELECT * FROM ai_insights
        WHERE user_id = $1
        ORDER BY date DESC
        LIMIT 1
        "#,
    )
    .bind(request.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound("No AI insights available yet. Please submit daily metrics first.".into())
    })?;

    Ok(ApiResponse::ok(insight_response(insight, None)))
}

pub async fn insight_history(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MetricsHistoryQuery>,
) -> AppResult<ApiResponse<InsightHistoryResponse>> {
    let since = Utc::now() - Duration::days(query.days);

    let insights = sqlx::query_as::<_, AiInsight>(
        r#"
        SELECT * FROM ai_insights
        WHERE user_id = $1 AND date >= $2
        ORDER BY date DESC
        "#,
    )
    .bind(query.user_id)
    .bind(since)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::ok(InsightHistoryResponse {
        user_id: query.user_id,
        insights: insights
            .into_iter()
            .map(|i| InsightHistoryEntry {
                id: i.id,
                date: i.date.date_naive(),
                phase: i.phase,
                confidence: i.confidence,
                suggestions_count: i.suggestions.0.len(),
            })
            .collect(),
    }))
}
