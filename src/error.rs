use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::dto::{ApiResponse, FieldIssue};
use crate::validation::{Location, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("AI service unavailable: {0}")]
    AiUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match &self {
            AppError::Validation(e) => {
                let summary = match e.location {
                    Location::Body => "Invalid request body",
                    Location::Query => "Invalid query parameters",
                    Location::Path => "Invalid path parameter",
                };
                tracing::debug!(field = %e.field, message = %e.message, "Request rejected");
                (
                    summary.to_string(),
                    Some(vec![FieldIssue {
                        field: e.field.clone(),
                        message: e.message.clone(),
                    }]),
                )
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::AiUnavailable(msg) => (msg.clone(), None),
            AppError::Database(e) if is_unique_violation(e) => {
                tracing::warn!(error = %e, "Unique constraint violated");
                ("A record with this data already exists".to_string(), None)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                ("An unexpected error occurred".to_string(), None)
            }
        };

        (status, ApiResponse::failure(message, details)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
