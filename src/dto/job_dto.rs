use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::Job;
use crate::services::job_service::JobList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub department: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub requirements: String,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub requirements: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_active: Option<bool>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
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

/// Job as shown to applicants; omits the owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicJobResponse {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicJobListResponse {
    pub items: Vec<PublicJobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            title: value.title,
            department: value.department,
            description: value.description,
            requirements: value.requirements,
            location: value.location,
            is_active: value.is_active,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Job> for PublicJobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            title: value.title,
            department: value.department,
            description: value.description,
            requirements: value.requirements,
            location: value.location,
            created_at: value.created_at,
        }
    }
}

impl From<JobList> for JobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl From<JobList> for PublicJobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}
