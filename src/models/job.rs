use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission and application totals for one job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JobActivity {
    pub job_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub submissions: i64,
    pub unviewed_submissions: i64,
    pub applications: i64,
}
