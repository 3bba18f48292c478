use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::AccountSummary;

/// Anonymous users have no email, username or password.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user row counts for GET /api/user/:id
#[derive(Debug, Clone, FromRow)]
pub struct UserActivityCounts {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub metrics_count: i64,
    pub insights_count: i64,
}

impl From<User> for AccountSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            onboarding_completed: u.onboarding_completed,
        }
    }
}
