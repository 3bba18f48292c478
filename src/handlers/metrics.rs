use axum::{extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::dto::{
    ApiResponse, DailyMetricResponse, LatestMetricResponse, MetricHistoryEntry,
    MetricsHistoryResponse,
};
use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::handlers::users::ensure_user_exists;
use crate::models::daily_metric::{format_clock_time, DailyMetric, UpsertedMetric};
use crate::validation::{InsightRequest, MetricsHistoryQuery, NewDailyMetric};
use crate::AppState;

/// One row per (user, date): a second submission for the same date
/// overwrites the first.
pub async fn upsert_daily_metric(
    State(state): State<AppState>,
    ValidatedJson(metric): ValidatedJson<NewDailyMetric>,
) -> AppResult<(StatusCode, ApiResponse<DailyMetricResponse>)> {
    ensure_user_exists(
        &state.db,
        metric.user_id,
        "User not found. Please create a user first.",
    )
    .await?;

    let sleep_duration = metric.sleep.map(|w| w.duration_hours());

    let saved = sqlx::query_as::<_, UpsertedMetric>(
        r#"
        INSERT INTO daily_metrics
            (id, user_id, date, sleep_start, sleep_end, sleep_duration, screen_time, activity_minutes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, date) DO UPDATE SET
            sleep_start = EXCLUDED.sleep_start,
            sleep_end = EXCLUDED.sleep_end,
            sleep_duration = EXCLUDED.sleep_duration,
            screen_time = EXCLUDED.screen_time,
            activity_minutes = EXCLUDED.activity_minutes,
            updated_at = NOW()
        RETURNING *, (xmax = 0) AS is_new_entry
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(metric.user_id)
    .bind(metric.date)
    .bind(metric.sleep.map(|w| w.start))
    .bind(metric.sleep.map(|w| w.end))
    .bind(sleep_duration)
    .bind(metric.screen_time)
    .bind(metric.activity_minutes)
    .fetch_one(&state.db)
    .await?;

    let UpsertedMetric {
        metric: row,
        is_new_entry,
    } = saved;

    tracing::info!(
        user_id = %row.user_id,
        date = %row.date,
        is_new_entry,
        "{} daily metric",
        if is_new_entry { "Created" } else { "Updated" }
    );

    let status = if is_new_entry {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok(ApiResponse::ok(DailyMetricResponse {
        id: row.id,
        user_id: row.user_id,
        date: row.date,
        sleep_duration: row.sleep_duration,
        screen_time: row.screen_time,
        activity_minutes: row.activity_minutes,
        is_new_entry,
    })
    .with_status(status))
}

pub async fn metrics_history(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MetricsHistoryQuery>,
) -> AppResult<ApiResponse<MetricsHistoryResponse>> {
    ensure_user_exists(&state.db, query.user_id, "User not found").await?;

    let end = Utc::now().date_naive();
    let start = end - Duration::days(query.days);

    let metrics = sqlx::query_as::<_, DailyMetric>(
        r#"
        SELECT * FROM daily_metrics
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date ASC
        "#,
    )
    .bind(query.user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    tracing::debug!(user_id = %query.user_id, days = query.days, rows = metrics.len(), "Fetched metrics history");

    let entries: Vec<MetricHistoryEntry> = metrics
        .into_iter()
        .map(|m| MetricHistoryEntry {
            id: m.id,
            date: m.date,
            sleep_duration: m.sleep_duration,
            screen_time: m.screen_time,
            activity_minutes: m.activity_minutes,
            sleep_start: m.sleep_start.map(format_clock_time),
            sleep_end: m.sleep_end.map(format_clock_time),
        })
        .collect();

    Ok(ApiResponse::ok(MetricsHistoryResponse {
        user_id: query.user_id,
        days_requested: query.days,
        days_returned: entries.len(),
        metrics: entries,
    }))
}

pub async fn latest_metric(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<InsightRequest>,
) -> AppResult<ApiResponse<LatestMetricResponse>> {
    let metric = sqlx::query_as::<_, DailyMetric>(
        r#"
        SELECT * FROM daily_metrics
        WHERE user_id = $1
        ORDER BY date DESC
        LIMIT 1
        "#,
    )
    .bind(query.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("No metrics found for this user".into()))?;

    Ok(ApiResponse::ok(LatestMetricResponse {
        id: metric.id,
        date: metric.date,
        sleep_duration: metric.sleep_duration,
        screen_time: metric.screen_time,
        activity_minutes: metric.activity_minutes,
    }))
}
