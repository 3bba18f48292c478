//! # MED BRAIN — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request` / `*Params` / `*Payload` → raw client input, checked by
//!   [`crate::validation`] before handlers see it
//! - `*Response` → serialized to client JSON inside an [`ApiResponse`]
//! - Field rules are expressed via `validator` derive macros
//! - Raw input keeps ids, dates and times as strings so that every rejection
//!   can carry a field-specific message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::insight::InsightStats;
use crate::validation::{
    check_activity_minutes, check_screen_time, validate_metric_date, validate_sleep_end,
    validate_sleep_start, validate_user_id, FieldSpec, JsonKind, RequestSchema,
    UNPAIRED_SLEEP_TIMES,
};

// ============================================================================
// Common
// ============================================================================

/// Stable envelope — every JSON response uses this shape
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
    pub timestamp: DateTime<Utc>,
}

/// One rejected field inside an error envelope
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Pair the envelope with a status other than 200.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Self) {
        (status, self)
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>, details: Option<Vec<FieldIssue>>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            details,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Raw payload carrying only a user id
/// (POST /api/ai/analyze body, GET /api/ai/latest query)
#[derive(Debug, Deserialize, Validate)]
pub struct UserRefPayload {
    #[serde(rename = "userId")]
    #[validate(custom = "validate_user_id")]
    pub user_id: String,
}

impl RequestSchema for UserRefPayload {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("userId", "user_id", JsonKind::String)];
}

// ============================================================================
// Users
// ============================================================================

/// POST /api/user
#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// GET /api/user/:id
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub metrics_count: i64,
    pub insights_count: i64,
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/signup
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 3, max = 50, message = "Username must be at least 3 characters"))]
    pub username: String,
}

impl RequestSchema for SignupRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("email", "email", JsonKind::String),
        FieldSpec::required("password", "password", JsonKind::String),
        FieldSpec::required("username", "username", JsonKind::String),
    ];
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RequestSchema for LoginRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("email", "email", JsonKind::String),
        FieldSpec::required("password", "password", JsonKind::String),
    ];
}

/// Account info returned by signup, login and /me
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub onboarding_completed: bool,
}

/// Response for signup and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AccountSummary,
    pub token: String,
    pub expires_in: i64,
}

// ============================================================================
// Daily metrics
// ============================================================================

/// POST /api/metrics/daily
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDailyMetricRequest {
    #[serde(rename = "userId")]
    #[validate(custom = "validate_user_id")]
    pub user_id: String,

    /// `YYYY-MM-DD`
    #[validate(custom = "validate_metric_date")]
    pub date: String,

    /// `HH:mm`, 24-hour. Must be sent together with `sleepEnd`.
    #[serde(rename = "sleepStart")]
    #[validate(custom = "validate_sleep_start")]
    pub sleep_start: Option<String>,

    #[serde(rename = "sleepEnd")]
    #[validate(custom = "validate_sleep_end")]
    pub sleep_end: Option<String>,

    /// Hours, 0-24
    #[serde(rename = "screenTime")]
    pub screen_time: f64,

    /// Minutes, 0-1440
    #[serde(rename = "activityMinutes")]
    pub activity_minutes: f64,
}

impl RequestSchema for CreateDailyMetricRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("userId", "user_id", JsonKind::String),
        FieldSpec::required("date", "date", JsonKind::String),
        FieldSpec::optional("sleepStart", "sleep_start", JsonKind::String),
        FieldSpec::optional("sleepEnd", "sleep_end", JsonKind::String),
        FieldSpec::required("screenTime", "screen_time", JsonKind::Number),
        FieldSpec::required("activityMinutes", "activity_minutes", JsonKind::Number),
    ];

    fn field_checks(&self) -> Vec<(&'static str, &'static str)> {
        [
            ("screenTime", check_screen_time(self.screen_time)),
            ("activityMinutes", check_activity_minutes(self.activity_minutes)),
        ]
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|message| (field, message)))
        .collect()
    }
}

/// Response for POST /api/metrics/daily
#[derive(Debug, Serialize)]
pub struct DailyMetricResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sleep_duration: Option<f64>,
    pub screen_time: f64,
    pub activity_minutes: f64,
    pub is_new_entry: bool,
}

/// GET /api/metrics/history and GET /api/ai/history query params
#[derive(Debug, Deserialize, Validate)]
pub struct MetricsHistoryParams {
    #[serde(rename = "userId")]
    #[validate(custom = "validate_user_id")]
    pub user_id: String,

    /// Free text; parsed leniently and clamped to 1-365. Default: 30
    pub days: Option<String>,
}

impl RequestSchema for MetricsHistoryParams {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("userId", "user_id", JsonKind::String),
        FieldSpec::optional("days", "days", JsonKind::String),
    ];
}

/// Single row in the metrics history chart
#[derive(Debug, Serialize)]
pub struct MetricHistoryEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub sleep_duration: Option<f64>,
    pub screen_time: f64,
    pub activity_minutes: f64,
    /// `HH:mm`
    pub sleep_start: Option<String>,
    pub sleep_end: Option<String>,
}

/// GET /api/metrics/history
#[derive(Debug, Serialize)]
pub struct MetricsHistoryResponse {
    pub user_id: Uuid,
    pub days_requested: i64,
    pub days_returned: usize,
    pub metrics: Vec<MetricHistoryEntry>,
}

/// GET /api/metrics/latest
#[derive(Debug, Serialize)]
pub struct LatestMetricResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub sleep_duration: Option<f64>,
    pub screen_time: f64,
    pub activity_minutes: f64,
}

// ============================================================================
// AI insights
// ============================================================================

/// Response for POST /api/ai/analyze and GET /api/ai/latest
#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight_id: Uuid,
    pub date: NaiveDate,
    pub phase: i32,
    pub phase_description: &'static str,
    pub confidence: f64,
    pub confidence_level: &'static str,
    pub suggestions: Vec<String>,
    pub stats: InsightStats,
    /// Only set on fresh analyses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_duration_ms: Option<u64>,
}

/// Single row in GET /api/ai/history
#[derive(Debug, Serialize)]
pub struct InsightHistoryEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub phase: i32,
    pub confidence: f64,
    pub suggestions_count: usize,
}

/// GET /api/ai/history
#[derive(Debug, Serialize)]
pub struct InsightHistoryResponse {
    pub user_id: Uuid,
    pub insights: Vec<InsightHistoryEntry>,
}

// ============================================================================
// Validation helpers
// ============================================================================

impl CreateDailyMetricRequest {
    /// Sleep start and end are all-or-nothing
    pub fn validate_sleep_window(&self) -> Result<(), String> {
        let has_start = self.sleep_start.as_deref().is_some_and(|s| !s.is_empty());
        let has_end = self.sleep_end.as_deref().is_some_and(|s| !s.is_empty());
        if has_start != has_end {
            return Err(UNPAIRED_SLEEP_TIMES.into());
        }
        Ok(())
    }
}
