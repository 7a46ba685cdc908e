use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::dashboard_dto::DashboardResponse, error::Result, middleware::auth::HrIdentity, AppState,
};

#[utoipa::path(
    get,
    path = "/api/hr/dashboard",
    responses(
        (status = 200, description = "Activity across the caller's jobs", body = DashboardResponse)
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
) -> Result<impl IntoResponse> {
    let owner = hr.user_id;
    let (jobs, departments, application_statuses, unviewed_submissions, unviewed_applications) = tokio::try_join!(
        state.job_service.activity(owner),
        state.cv_service.department_counts(owner),
        state.application_service.status_counts(owner),
        state.cv_service.unviewed_count(owner),
        state.application_service.unviewed_count(owner),
    )?;

    Ok(Json(DashboardResponse {
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|job| job.is_active).count(),
        unviewed_submissions,
        unviewed_applications,
        jobs,
        departments,
        application_statuses,
    }))
}
