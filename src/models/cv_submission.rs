use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvSubmission {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub cv_path: String,
    pub cv_filename: String,
    pub cv_content_type: String,
    pub department: String,
    pub is_viewed: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DepartmentCount {
    pub department: String,
    pub submissions: i64,
}
