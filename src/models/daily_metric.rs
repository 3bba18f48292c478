use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sleep_start: Option<NaiveTime>,
    pub sleep_end: Option<NaiveTime>,
    pub sleep_duration: Option<f64>,
    pub screen_time: f64,
    pub activity_minutes: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by the daily upsert; `is_new_entry` is false when an
/// existing (user, date) row was overwritten.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedMetric {
    #[sqlx(flatten)]
    pub metric: DailyMetric,
    pub is_new_entry: bool,
}

/// A night's sleep as wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SleepWindow {
    /// Hours slept, to two decimals. An end at or before the start is taken
    /// to be on the following day.
    pub fn duration_hours(&self) -> f64 {
        let start = minutes_of_day(self.start);
        let mut end = minutes_of_day(self.end);
        if end <= start {
            end += MINUTES_PER_DAY;
        }
        let hours = (end - start) as f64 / 60.0;
        (hours * 100.0).round() / 100.0
    }
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// `HH:mm` rendering used in API responses
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
