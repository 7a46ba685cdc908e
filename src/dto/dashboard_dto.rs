use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::cv_submission::DepartmentCount;
use crate::models::detailed_application::OverallStatusCount;
use crate::models::job::JobActivity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub unviewed_submissions: i64,
    pub unviewed_applications: i64,
    pub jobs: Vec<JobActivity>,
    pub departments: Vec<DepartmentCount>,
    pub application_statuses: Vec<OverallStatusCount>,
}
