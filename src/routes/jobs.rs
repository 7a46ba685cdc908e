use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, JobListQuery, JobListResponse, JobResponse, PublicJobListResponse,
        PublicJobResponse, UpdateJobPayload,
    },
    error::Result,
    middleware::auth::HrIdentity,
    services::job_service::JobScope,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/hr/jobs",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("is_active" = Option<bool>, Query, description = "Filter by visibility"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("location" = Option<String>, Query, description = "Filter by location"),
        ("search" = Option<String>, Query, description = "Search title, description and requirements")
    ),
    responses(
        (status = 200, description = "Jobs owned by the caller", body = JobListResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let result = state
        .job_service
        .list(JobScope::Owner(hr.user_id), query)
        .await?;
    Ok(Json(JobListResponse::from(result)))
}

#[utoipa::path(
    post,
    path = "/api/hr/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(hr.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/hr/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_owned(hr.user_id, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/hr/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found")
    )
)]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.update(hr.user_id, id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/hr/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is referenced by submissions or links")
    )
)]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(hr.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/hr/jobs/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Visibility flipped", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
pub async fn toggle_job_status(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.toggle_active(hr.user_id, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    get,
    path = "/api/public/jobs",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("location" = Option<String>, Query, description = "Filter by location"),
        ("search" = Option<String>, Query, description = "Search title, description and requirements")
    ),
    responses(
        (status = 200, description = "Active jobs", body = PublicJobListResponse)
    )
)]
pub async fn list_public_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.job_service.list(JobScope::Public, query).await?;
    Ok(Json(PublicJobListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/public/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Active job", body = PublicJobResponse),
        (status = 404, description = "Job not found or inactive")
    )
)]
pub async fn get_public_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_active(id).await?;
    Ok(Json(PublicJobResponse::from(job)))
}
