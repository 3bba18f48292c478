//! # MED BRAIN — Request validation
//!
//! Every API payload passes through one of the validators in this module
//! before a handler sees it. A validator takes the raw JSON (a request body,
//! or a query string lifted into a JSON object of strings) and returns either
//! a typed command or the first [`ValidationError`] it finds.
//!
//! Fields are judged in the schema's declared order and the first failing
//! field is reported. A field fails when it is missing, has the wrong JSON
//! type, or breaks one of its rules (`validator` derive rules declared on the
//! DTOs in [`crate::dto`], plus [`RequestSchema::field_checks`]). Cross-field
//! rules such as the sleep window pairing run only once every field passes.
//!
//! Validators are pure and synchronous.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CreateDailyMetricRequest, LoginRequest, MetricsHistoryParams, SignupRequest, UserRefPayload,
};
use crate::models::daily_metric::SleepWindow;

pub const DEFAULT_HISTORY_DAYS: i64 = 30;
pub const MIN_HISTORY_DAYS: i64 = 1;
pub const MAX_HISTORY_DAYS: i64 = 365;

pub const MAX_SCREEN_TIME_HOURS: f64 = 24.0;
pub const MAX_ACTIVITY_MINUTES: f64 = 1440.0;

// ============================================================================
// Errors
// ============================================================================

/// Where the offending input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Query,
    Path,
}

impl Location {
    /// Field name used when a failure concerns the payload as a whole.
    pub fn root(self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Query => "query",
            Location::Path => "path",
        }
    }
}

/// A single rejected field with a message fit to show an API client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub location: Location,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            location,
        }
    }
}

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Number,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Number => value.is_number(),
        }
    }

    /// A well-typed stand-in that deserializes cleanly.
    fn placeholder(self) -> Value {
        match self {
            JsonKind::String => Value::String(String::new()),
            JsonKind::Number => Value::from(0),
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonKind::String => f.write_str("string"),
            JsonKind::Number => f.write_str("number"),
        }
    }
}

/// One field of a request schema.
///
/// `wire` is the name the client sends, `rust` the struct field name the
/// `validator` derive reports errors under.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub wire: &'static str,
    pub rust: &'static str,
    pub kind: JsonKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(wire: &'static str, rust: &'static str, kind: JsonKind) -> Self {
        Self {
            wire,
            rust,
            kind,
            required: true,
        }
    }

    pub const fn optional(wire: &'static str, rust: &'static str, kind: JsonKind) -> Self {
        Self {
            wire,
            rust,
            kind,
            required: false,
        }
    }
}

/// A request DTO with a declared field list.
///
/// `FIELDS` fixes the order in which fields are judged.
pub trait RequestSchema: DeserializeOwned + Validate {
    const FIELDS: &'static [FieldSpec];

    /// Field rules the `validator` derive does not express, as
    /// `(wire name, message)` pairs.
    fn field_checks(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First missing or mistyped field, with its index in `fields`.
fn shape_violation(
    object: &Map<String, Value>,
    fields: &[FieldSpec],
    location: Location,
) -> Option<(usize, ValidationError)> {
    fields.iter().enumerate().find_map(|(index, spec)| {
        let message = match object.get(spec.wire) {
            None | Some(Value::Null) if spec.required => format!("{} is required", spec.wire),
            Some(found) if !found.is_null() && !spec.kind.matches(found) => {
                format!("Expected {}, received {}", spec.kind, json_type_name(found))
            }
            _ => return None,
        };
        Some((index, ValidationError::new(spec.wire, location, message)))
    })
}

fn rule_message(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// First field in `fields` whose rules reject `payload`.
fn first_rule_violation<T: RequestSchema>(
    payload: &T,
    fields: &[FieldSpec],
    location: Location,
) -> Option<ValidationError> {
    let derived = payload.validate().err();
    let by_field = derived
        .as_ref()
        .map(|errors| errors.field_errors())
        .unwrap_or_default();
    let checks = payload.field_checks();

    fields.iter().find_map(|spec| {
        let derived_hit = by_field
            .get(spec.rust)
            .or_else(|| by_field.get(spec.wire))
            .and_then(|list| list.first())
            .map(rule_message);
        let check_hit = || {
            checks
                .iter()
                .find(|(field, _)| *field == spec.wire)
                .map(|(_, message)| message.to_string())
        };
        derived_hit
            .or_else(check_hit)
            .map(|message| ValidationError::new(spec.wire, location, message))
    })
}

/// Rule failure on a field declared before `index`. Fields from `index` on
/// are swapped for placeholders so the payload still decodes.
fn earlier_rule_violation<T: RequestSchema>(
    object: &Map<String, Value>,
    index: usize,
    location: Location,
) -> Option<ValidationError> {
    let (earlier, rest) = T::FIELDS.split_at(index);
    if earlier.is_empty() {
        return None;
    }
    let mut patched = object.clone();
    for spec in rest {
        patched.insert(spec.wire.to_string(), spec.kind.placeholder());
    }
    let payload = T::deserialize(&Value::Object(patched)).ok()?;
    first_rule_violation(&payload, earlier, location)
}

/// Decode `value` into `T`, judging its fields in `T::FIELDS` order.
pub fn parse_payload<T: RequestSchema>(
    value: &Value,
    location: Location,
) -> Result<T, ValidationError> {
    let object = value.as_object().ok_or_else(|| {
        ValidationError::new(
            location.root(),
            location,
            format!("Expected object, received {}", json_type_name(value)),
        )
    })?;

    if let Some((index, shape_error)) = shape_violation(object, T::FIELDS, location) {
        return Err(earlier_rule_violation::<T>(object, index, location).unwrap_or(shape_error));
    }

    let payload = T::deserialize(value)
        .map_err(|e| ValidationError::new(location.root(), location, e.to_string()))?;

    match first_rule_violation(&payload, T::FIELDS, location) {
        Some(error) => Err(error),
        None => Ok(payload),
    }
}

// ============================================================================
// Field rules
// ============================================================================

pub const INVALID_USER_ID: &str = "Invalid user ID format";
pub const INVALID_DATE: &str = "Invalid date format. Use ISO 8601 format (YYYY-MM-DD)";
pub const INVALID_SLEEP_START: &str = "Invalid sleep start time. Use HH:mm format (24-hour)";
pub const INVALID_SLEEP_END: &str = "Invalid sleep end time. Use HH:mm format (24-hour)";
pub const UNPAIRED_SLEEP_TIMES: &str = "Both sleep start and end times must be provided together";

fn rule_error(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Hyphenated 8-4-4-4-12 hex UUID, either case.
pub fn parse_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date is taken.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// 24-hour `H:mm` / `HH:mm`.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Leading signed integer of `raw`, ignoring leading whitespace.
/// Saturates instead of overflowing.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Lookback window in days: default 30, clamped into [1, 365].
pub fn parse_days(raw: Option<&str>) -> i64 {
    raw.filter(|s| !s.is_empty())
        .and_then(leading_integer)
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(MIN_HISTORY_DAYS, MAX_HISTORY_DAYS)
}

pub fn validate_user_id(raw: &str) -> Result<(), validator::ValidationError> {
    parse_uuid(raw)
        .map(|_| ())
        .ok_or_else(|| rule_error("uuid", INVALID_USER_ID))
}

pub fn validate_metric_date(raw: &str) -> Result<(), validator::ValidationError> {
    parse_calendar_date(raw)
        .map(|_| ())
        .ok_or_else(|| rule_error("date", INVALID_DATE))
}

pub fn validate_sleep_start(raw: &str) -> Result<(), validator::ValidationError> {
    parse_clock_time(raw)
        .map(|_| ())
        .ok_or_else(|| rule_error("time", INVALID_SLEEP_START))
}

pub fn validate_sleep_end(raw: &str) -> Result<(), validator::ValidationError> {
    parse_clock_time(raw)
        .map(|_| ())
        .ok_or_else(|| rule_error("time", INVALID_SLEEP_END))
}

pub fn check_screen_time(hours: f64) -> Result<(), &'static str> {
    if hours < 0.0 {
        return Err("Screen time cannot be negative");
    }
    if hours > MAX_SCREEN_TIME_HOURS {
        return Err("Screen time cannot exceed 24 hours");
    }
    Ok(())
}

pub fn check_activity_minutes(minutes: f64) -> Result<(), &'static str> {
    if minutes < 0.0 {
        return Err("Activity minutes cannot be negative");
    }
    if minutes > MAX_ACTIVITY_MINUTES {
        return Err("Activity minutes cannot exceed 1440 (24 hours)");
    }
    Ok(())
}

// ============================================================================
// Validated commands
// ============================================================================

/// Anonymous user creation carries no input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewUser;

#[derive(Debug, Clone, PartialEq)]
pub struct NewDailyMetric {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sleep: Option<SleepWindow>,
    pub screen_time: f64,
    pub activity_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsHistoryQuery {
    pub user_id: Uuid,
    pub days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

fn user_id_of(raw: &str, location: Location) -> Result<Uuid, ValidationError> {
    parse_uuid(raw).ok_or_else(|| ValidationError::new("userId", location, INVALID_USER_ID))
}

// ============================================================================
// Validators
// ============================================================================

/// User identity is server-assigned, so any body (or none) is accepted.
pub fn validate_create_user(_body: Option<&Value>) -> Result<NewUser, ValidationError> {
    Ok(NewUser)
}

pub fn validate_create_daily_metric(body: &Value) -> Result<NewDailyMetric, ValidationError> {
    let request: CreateDailyMetricRequest = parse_payload(body, Location::Body)?;

    request
        .validate_sleep_window()
        .map_err(|message| ValidationError::new("sleepStart", Location::Body, message))?;

    let user_id = user_id_of(&request.user_id, Location::Body)?;
    let date = parse_calendar_date(&request.date)
        .ok_or_else(|| ValidationError::new("date", Location::Body, INVALID_DATE))?;

    let start = request.sleep_start.as_deref().and_then(parse_clock_time);
    let end = request.sleep_end.as_deref().and_then(parse_clock_time);
    let sleep = match (start, end) {
        (Some(start), Some(end)) => Some(SleepWindow { start, end }),
        _ => None,
    };

    Ok(NewDailyMetric {
        user_id,
        date,
        sleep,
        screen_time: request.screen_time,
        activity_minutes: request.activity_minutes,
    })
}

pub fn validate_metrics_history_query(query: &Value) -> Result<MetricsHistoryQuery, ValidationError> {
    let params: MetricsHistoryParams = parse_payload(query, Location::Query)?;
    Ok(MetricsHistoryQuery {
        user_id: user_id_of(&params.user_id, Location::Query)?,
        days: parse_days(params.days.as_deref()),
    })
}

pub fn validate_analyze_metrics(body: &Value) -> Result<InsightRequest, ValidationError> {
    let payload: UserRefPayload = parse_payload(body, Location::Body)?;
    Ok(InsightRequest {
        user_id: user_id_of(&payload.user_id, Location::Body)?,
    })
}

pub fn validate_get_latest_insight(query: &Value) -> Result<InsightRequest, ValidationError> {
    let payload: UserRefPayload = parse_payload(query, Location::Query)?;
    Ok(InsightRequest {
        user_id: user_id_of(&payload.user_id, Location::Query)?,
    })
}

/// `GET /api/user/:id`
pub fn validate_user_path(raw: &str) -> Result<Uuid, ValidationError> {
    parse_uuid(raw).ok_or_else(|| ValidationError::new("id", Location::Path, INVALID_USER_ID))
}

pub fn validate_signup(body: &Value) -> Result<NewAccount, ValidationError> {
    let request: SignupRequest = parse_payload(body, Location::Body)?;
    Ok(NewAccount {
        email: request.email.trim().to_lowercase(),
        username: request.username,
        password: request.password,
    })
}

pub fn validate_login(body: &Value) -> Result<Credentials, ValidationError> {
    let request: LoginRequest = parse_payload(body, Location::Body)?;
    Ok(Credentials {
        email: request.email.trim().to_lowercase(),
        password: request.password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER: &str = "3f2c8a1e-9b4d-4c6e-8f7a-1b2c3d4e5f60";

    fn metric(overrides: Value) -> Value {
        let mut body = json!({
            "userId": USER,
            "date": "2024-03-15",
            "screenTime": 0,
            "activityMinutes": 0,
        });
        if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        body
    }

    #[test]
    fn minimal_metric_is_accepted() {
        for date in ["2024-03-15", "2000-02-29", "2024-12-31T23:00:00Z"] {
            let result = validate_create_daily_metric(&metric(json!({ "date": date })));
            assert!(result.is_ok(), "{date} should be accepted: {result:?}");
        }

        let accepted = validate_create_daily_metric(&metric(json!({}))).unwrap();
        assert_eq!(accepted.user_id, Uuid::parse_str(USER).unwrap());
        assert_eq!(accepted.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(accepted.sleep.is_none());
    }

    #[test]
    fn uppercase_uuid_is_accepted() {
        let body = metric(json!({ "userId": USER.to_uppercase() }));
        assert!(validate_create_daily_metric(&body).is_ok());
    }

    #[test]
    fn malformed_user_id_names_the_field() {
        for bad in ["not-a-uuid", "", "3f2c8a1e9b4d4c6e8f7a1b2c3d4e5f60"] {
            let err = validate_create_daily_metric(&metric(json!({ "userId": bad }))).unwrap_err();
            assert_eq!(err.field, "userId");
            assert_eq!(err.message, INVALID_USER_ID);
            assert_eq!(err.location, Location::Body);
        }
    }

    #[test]
    fn unparsable_date_is_rejected() {
        for bad in ["2024-02-30", "yesterday", "15/03/2024", ""] {
            let err = validate_create_daily_metric(&metric(json!({ "date": bad }))).unwrap_err();
            assert_eq!(err.field, "date", "{bad}");
            assert_eq!(err.message, INVALID_DATE);
        }
    }

    #[test]
    fn sleep_window_must_be_paired() {
        let err = validate_create_daily_metric(&metric(json!({ "sleepStart": "23:00" }))).unwrap_err();
        assert_eq!(err.field, "sleepStart");
        assert_eq!(err.message, UNPAIRED_SLEEP_TIMES);

        let err = validate_create_daily_metric(&metric(json!({ "sleepEnd": "07:00" }))).unwrap_err();
        assert_eq!(err.field, "sleepStart");

        let err = validate_create_daily_metric(&metric(json!({
            "sleepStart": "23:00",
            "sleepEnd": null,
        })))
        .unwrap_err();
        assert_eq!(err.field, "sleepStart");
    }

    #[test]
    fn paired_sleep_window_is_kept() {
        let accepted = validate_create_daily_metric(&metric(json!({
            "sleepStart": "23:15",
            "sleepEnd": "7:05",
        })))
        .unwrap();
        let sleep = accepted.sleep.unwrap();
        assert_eq!(sleep.start, NaiveTime::from_hms_opt(23, 15, 0).unwrap());
        assert_eq!(sleep.end, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
    }

    #[test]
    fn sleep_times_must_be_24_hour() {
        for bad in ["24:00", "7:5", "07:30:00", "7pm", "12:60", ""] {
            let err = validate_create_daily_metric(&metric(json!({
                "sleepStart": bad,
                "sleepEnd": "07:00",
            })))
            .unwrap_err();
            assert_eq!(err.field, "sleepStart", "{bad}");
            assert_eq!(err.message, INVALID_SLEEP_START);
        }

        let err = validate_create_daily_metric(&metric(json!({
            "sleepStart": "23:00",
            "sleepEnd": "25:00",
        })))
        .unwrap_err();
        assert_eq!(err.field, "sleepEnd");
        assert_eq!(err.message, INVALID_SLEEP_END);
    }

    #[test]
    fn screen_time_bounds_are_inclusive() {
        assert!(validate_create_daily_metric(&metric(json!({ "screenTime": 24 }))).is_ok());
        assert!(validate_create_daily_metric(&metric(json!({ "screenTime": 4.5 }))).is_ok());

        let err = validate_create_daily_metric(&metric(json!({ "screenTime": 24.01 }))).unwrap_err();
        assert_eq!(err.field, "screenTime");
        assert_eq!(err.message, "Screen time cannot exceed 24 hours");

        let err = validate_create_daily_metric(&metric(json!({ "screenTime": -0.01 }))).unwrap_err();
        assert_eq!(err.field, "screenTime");
        assert_eq!(err.message, "Screen time cannot be negative");
    }

    #[test]
    fn activity_minutes_bounds_are_inclusive() {
        assert!(validate_create_daily_metric(&metric(json!({ "activityMinutes": 1440 }))).is_ok());

        let err = validate_create_daily_metric(&metric(json!({ "activityMinutes": 1441 }))).unwrap_err();
        assert_eq!(err.field, "activityMinutes");
        assert_eq!(err.message, "Activity minutes cannot exceed 1440 (24 hours)");

        let err = validate_create_daily_metric(&metric(json!({ "activityMinutes": -1 }))).unwrap_err();
        assert_eq!(err.message, "Activity minutes cannot be negative");
    }

    #[test]
    fn missing_and_mistyped_fields_are_attributed() {
        let mut body = metric(json!({}));
        body.as_object_mut().unwrap().remove("screenTime");
        let err = validate_create_daily_metric(&body).unwrap_err();
        assert_eq!(err.field, "screenTime");
        assert_eq!(err.message, "screenTime is required");

        let err = validate_create_daily_metric(&metric(json!({ "activityMinutes": "30" }))).unwrap_err();
        assert_eq!(err.field, "activityMinutes");
        assert_eq!(err.message, "Expected number, received string");

        let err = validate_create_daily_metric(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "body");
    }

    #[test]
    fn first_invalid_field_wins() {
        let err = validate_create_daily_metric(&metric(json!({
            "userId": "nope",
            "date": "nope",
            "screenTime": 99,
        })))
        .unwrap_err();
        assert_eq!(err.field, "userId");

        let err = validate_create_daily_metric(&metric(json!({
            "screenTime": 99,
            "activityMinutes": 9999,
        })))
        .unwrap_err();
        assert_eq!(err.field, "screenTime");
    }

    #[test]
    fn earlier_rule_failure_beats_later_missing_or_mistyped_field() {
        let mut body = metric(json!({ "userId": "not-a-uuid" }));
        body.as_object_mut().unwrap().remove("screenTime");
        let err = validate_create_daily_metric(&body).unwrap_err();
        assert_eq!(err.field, "userId");
        assert_eq!(err.message, INVALID_USER_ID);

        let err = validate_create_daily_metric(&metric(json!({
            "userId": "not-a-uuid",
            "screenTime": "3",
        })))
        .unwrap_err();
        assert_eq!(err.field, "userId");

        let mut body = metric(json!({ "date": "yesterday", "screenTime": 99 }));
        body.as_object_mut().unwrap().remove("activityMinutes");
        let err = validate_create_daily_metric(&body).unwrap_err();
        assert_eq!(err.field, "date");

        let err = validate_create_daily_metric(&metric(json!({
            "screenTime": 99,
            "activityMinutes": "lots",
        })))
        .unwrap_err();
        assert_eq!(err.field, "screenTime");
        assert_eq!(err.message, "Screen time cannot exceed 24 hours");

        let err = validate_signup(&json!({ "email": "nope", "username": "ada" })).unwrap_err();
        assert_eq!(err.field, "email");
    }

    #[test]
    fn history_days_defaults_and_clamps() {
        let cases = [
            (json!({ "userId": USER }), 30),
            (json!({ "userId": USER, "days": "0" }), 1),
            (json!({ "userId": USER, "days": "9999" }), 365),
            (json!({ "userId": USER, "days": "abc" }), 30),
            (json!({ "userId": USER, "days": "-12" }), 1),
            (json!({ "userId": USER, "days": "" }), 30),
            (json!({ "userId": USER, "days": "14" }), 14),
            (json!({ "userId": USER, "days": "7.9" }), 7),
            (json!({ "userId": USER, "days": "99999999999999999999999" }), 365),
        ];
        for (query, expected) in cases {
            let parsed = validate_metrics_history_query(&query).unwrap();
            assert_eq!(parsed.days, expected, "{query}");
        }
    }

    #[test]
    fn history_requires_user_id() {
        let err = validate_metrics_history_query(&json!({ "days": "7" })).unwrap_err();
        assert_eq!(err.field, "userId");
        assert_eq!(err.location, Location::Query);

        let err = validate_metrics_history_query(&json!({ "userId": "abc" })).unwrap_err();
        assert_eq!(err.message, INVALID_USER_ID);
    }

    #[test]
    fn insight_requests_need_only_a_user_id() {
        let body = json!({ "userId": USER, "ignored": true });
        assert_eq!(
            validate_analyze_metrics(&body).unwrap().user_id,
            Uuid::parse_str(USER).unwrap()
        );
        assert!(validate_get_latest_insight(&json!({ "userId": USER })).is_ok());

        let err = validate_analyze_metrics(&json!({})).unwrap_err();
        assert_eq!(err.field, "userId");
        let err = validate_get_latest_insight(&json!({ "userId": "x" })).unwrap_err();
        assert_eq!(err.location, Location::Query);
    }

    #[test]
    fn create_user_accepts_anything() {
        assert!(validate_create_user(None).is_ok());
        assert!(validate_create_user(Some(&json!({}))).is_ok());
        assert!(validate_create_user(Some(&json!({ "name": "ignored" }))).is_ok());
    }

    #[test]
    fn signup_rules() {
        let ok = validate_signup(&json!({
            "email": "Ada@Example.com",
            "password": "correct horse",
            "username": "ada",
        }))
        .unwrap();
        assert_eq!(ok.email, "ada@example.com");

        let err = validate_signup(&json!({
            "email": "not-an-email",
            "password": "short",
            "username": "ab",
        }))
        .unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.message, "Please enter a valid email");

        let err = validate_signup(&json!({
            "email": "ada@example.com",
            "password": "short",
            "username": "ada",
        }))
        .unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn login_requires_password() {
        let err = validate_login(&json!({ "email": "ada@example.com", "password": "" })).unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.message, "Password is required");
    }
}
