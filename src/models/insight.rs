use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct AiInsight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub phase: i32,
    pub confidence: f64,
    pub suggestions: Json<Vec<String>>,
    pub stats: Json<InsightStats>,
    pub created_at: DateTime<Utc>,
}

/// Averages computed by the AI service over the analysed window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightStats {
    pub avg_sleep: f64,
    pub avg_screen: f64,
    pub avg_activity: f64,
}

/// Data-availability tier reported by the AI service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum AnalysisPhase {
    /// Fewer than 7 days of data; global priors only
    ColdStart,
    /// 7-29 days; blended model
    WarmUp,
    /// 30+ days; personalized model
    Personalized,
}

impl AnalysisPhase {
    pub fn from_days_of_data(days: usize) -> Self {
        match days {
            0..=6 => Self::ColdStart,
            7..=29 => Self::WarmUp,
            _ => Self::Personalized,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ColdStart => {
                "Building your personalized profile based on general health patterns."
            }
            Self::WarmUp => "Refining recommendations as we learn more about your habits.",
            Self::Personalized => "Highly personalized insights based on your unique patterns.",
        }
    }
}

impl From<AnalysisPhase> for i32 {
    fn from(phase: AnalysisPhase) -> Self {
        match phase {
            AnalysisPhase::ColdStart => 0,
            AnalysisPhase::WarmUp => 1,
            AnalysisPhase::Personalized => 2,
        }
    }
}

impl TryFrom<i32> for AnalysisPhase {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ColdStart),
            1 => Ok(Self::WarmUp),
            2 => Ok(Self::Personalized),
            other => Err(format!("unknown analysis phase {}", other)),
        }
    }
}

/// Human-readable text for a stored phase number
pub fn phase_description(phase: i32) -> &'static str {
    AnalysisPhase::try_from(phase)
        .map(AnalysisPhase::description)
        .unwrap_or("Unknown phase")
}

pub fn confidence_level(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        "high"
    } else if confidence >= 0.5 {
        "medium"
    } else {
        "low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_thresholds() {
        assert_eq!(AnalysisPhase::from_days_of_data(0), AnalysisPhase::ColdStart);
        assert_eq!(AnalysisPhase::from_days_of_data(6), AnalysisPhase::ColdStart);
        assert_eq!(AnalysisPhase::from_days_of_data(7), AnalysisPhase::WarmUp);
        assert_eq!(AnalysisPhase::from_days_of_data(29), AnalysisPhase::WarmUp);
        assert_eq!(AnalysisPhase::from_days_of_data(30), AnalysisPhase::Personalized);
    }

    #[test]
    fn unknown_phase_has_fallback_text() {
        assert_eq!(phase_description(3), "Unknown phase");
        assert!(phase_description(1).starts_with("Refining"));
    }

    #[test]
    fn confidence_buckets() {
        assert_eq!(confidence_level(0.95), "high");
        assert_eq!(confidence_level(0.8), "high");
        assert_eq!(confidence_level(0.5), "medium");
        assert_eq!(confidence_level(0.49), "low");
    }

    #[test]
    fn phase_round_trips_as_integer() {
        let phase: AnalysisPhase = serde_json::from_str("2").unwrap();
        assert_eq!(phase, AnalysisPhase::Personalized);
        assert!(serde_json::from_str::<AnalysisPhase>("5").is_err());
    }
}
