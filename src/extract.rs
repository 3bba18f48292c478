//! Extractors that run the request validators before a handler is called.
//!
//! A handler asking for `ValidatedJson<NewDailyMetric>` receives an already
//! checked value; any rejection, including an unparsable body, is turned
//! into an `AppError::Validation` with the envelope described in
//! [`crate::error`].

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::validation::{
    validate_analyze_metrics, validate_create_daily_metric, validate_get_latest_insight,
    validate_login, validate_metrics_history_query, validate_signup, Credentials, InsightRequest,
    Location, MetricsHistoryQuery, NewAccount, NewDailyMetric, ValidationError,
};

pub trait FromJsonBody: Sized {
    fn from_body(body: &Value) -> Result<Self, ValidationError>;
}

pub trait FromQueryParams: Sized {
    fn from_query(query: &Value) -> Result<Self, ValidationError>;
}

impl FromJsonBody for NewDailyMetric {
    fn from_body(body: &Value) -> Result<Self, ValidationError> {
        validate_create_daily_metric(body)
    }
}

impl FromJsonBody for InsightRequest {
    fn from_body(body: &Value) -> Result<Self, ValidationError> {
        validate_analyze_metrics(body)
    }
}

impl FromJsonBody for NewAccount {
    fn from_body(body: &Value) -> Result<Self, ValidationError> {
        validate_signup(body)
    }
}

impl FromJsonBody for Credentials {
    fn from_body(body: &Value) -> Result<Self, ValidationError> {
        validate_login(body)
    }
}

impl FromQueryParams for MetricsHistoryQuery {
    fn from_query(query: &Value) -> Result<Self, ValidationError> {
        validate_metrics_history_query(query)
    }
}

impl FromQueryParams for InsightRequest {
    fn from_query(query: &Value) -> Result<Self, ValidationError> {
        validate_get_latest_insight(query)
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: FromJsonBody,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ValidationError::new(Location::Body.root(), Location::Body, rejection.body_text())
            })?;

        Ok(ValidatedJson(T::from_body(&body)?))
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: FromQueryParams,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ValidationError::new(Location::Query.root(), Location::Query, rejection.body_text())
            })?;

        let object: Map<String, Value> = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        Ok(ValidatedQuery(T::from_query(&Value::Object(object))?))
    }
}
