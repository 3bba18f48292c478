//! Client for the health suggestion service.
//!
//! The service owns phase selection, confidence scoring and suggestion
//! text; this module only ships metrics to it and maps failures onto
//! [`AppError`].

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::daily_metric::DailyMetric;
use crate::models::insight::{AnalysisPhase, InsightStats};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, PartialEq)]
pub struct AnalyzePayload {
    pub user_id: Uuid,
    pub metrics: Vec<MetricPoint>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub sleep_duration: f64,
    pub screen_time: f64,
    pub activity_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResult {
    pub phase: AnalysisPhase,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub stats: InsightStats,
}

/// Oldest first; absent sleep is sent as zero and activity as whole minutes.
pub fn build_analyze_payload(user_id: Uuid, metrics: &[DailyMetric]) -> AnalyzePayload {
    let mut points: Vec<MetricPoint> = metrics
        .iter()
        .map(|m| MetricPoint {
            date: m.date,
            sleep_duration: m.sleep_duration.unwrap_or(0.0),
            screen_time: m.screen_time,
            activity_minutes: m.activity_minutes.round() as i64,
        })
        .collect();
    points.sort_by_key(|p| p.date);

    AnalyzePayload {
        user_id,
        metrics: points,
    }
}

#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.ai_service_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.ai_service_url.clone(),
        })
    }

    pub async fn analyze(&self, user_id: Uuid, metrics: &[DailyMetric]) -> AppResult<AnalysisResult> {
        let payload = build_analyze_payload(user_id, metrics);
        let url = format!("{}/analyze", self.base_url);
        let started = Instant::now();

        tracing::debug!(user_id = %user_id, days = payload.metrics.len(), url = %url, "Sending metrics to AI service");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "AI service returned an error");
            return Err(AppError::AiUnavailable(upstream_error_message(status, &body)));
        }

        let result: AnalysisResult = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Malformed AI service response: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            phase = i32::from(result.phase),
            confidence = result.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "AI analysis completed"
        );
        Ok(result)
    }

    /// True when the service answers its health endpoint with 2xx.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "AI service health check failed");
                false
            }
        }
    }
}

#[derive(Deserialize)]
struct UpstreamError {
    message: Option<String>,
}

/// The service's own `message` when it sent one, else the status reason.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<UpstreamError>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string())
        });
    format!("AI service error: {}", message)
}

fn unavailable(url: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        tracing::error!(url = %url, "AI service timed out");
        AppError::AiUnavailable("AI service did not respond. Please try again.".into())
    } else {
        tracing::error!(url = %url, error = %e, "AI service unreachable");
        AppError::AiUnavailable(
            "AI service is currently unavailable. Please try again later.".into(),
        )
    }
}
