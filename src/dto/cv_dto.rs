use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::cv_submission::CvSubmission;
use crate::models::detailed_application::GENERAL_APPLICATION;
use crate::services::cv_service::SubmissionList;

/// Text fields of the multipart CV upload.
#[derive(Debug, Clone, Default, Validate)]
pub struct CvSubmissionForm {
    #[validate(length(min = 1, max = 150))]
    pub applicant_name: String,
    #[validate(email)]
    pub applicant_email: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubmissionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub job_id: Option<Uuid>,
    pub department: Option<String>,
    pub is_viewed: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub job_title: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub department: String,
    pub cv_filename: String,
    pub cv_url: String,
    pub is_viewed: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionListResponse {
    pub items: Vec<SubmissionResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Acknowledgement returned to the applicant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CvSubmittedResponse {
    pub id: Uuid,
    pub job_title: String,
    pub submitted_at: DateTime<Utc>,
    pub message: String,
}

impl From<CvSubmission> for SubmissionResponse {
    fn from(value: CvSubmission) -> Self {
        Self {
            cv_url: format!("/api/hr/submissions/{}/cv", value.id),
            id: value.id,
            job_id: value.job_id,
            job_title: value
                .job_title
                .unwrap_or_else(|| GENERAL_APPLICATION.to_string()),
            applicant_name: value.applicant_name,
            applicant_email: value.applicant_email,
            department: value.department,
            cv_filename: value.cv_filename,
            is_viewed: value.is_viewed,
            submitted_at: value.submitted_at,
        }
    }
}

impl From<SubmissionList> for SubmissionListResponse {
    fn from(value: SubmissionList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl From<&CvSubmission> for CvSubmittedResponse {
    fn from(value: &CvSubmission) -> Self {
        Self {
            id: value.id,
            job_title: value
                .job_title
                .clone()
                .unwrap_or_else(|| GENERAL_APPLICATION.to_string()),
            submitted_at: value.submitted_at,
            message: "Your CV has been submitted".to_string(),
        }
    }
}
