use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationDetailResponse, ApplicationListQuery, ApplicationListResponse,
        StatusUpdateResponse, UpdateApplicationPayload,
    },
    error::Result,
    middleware::auth::HrIdentity,
    services::notification_service::DispatchReport,
    utils::time::now,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/hr/applications",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("job_id" = Option<Uuid>, Query, description = "Filter by job"),
        ("overall_status" = Option<String>, Query, description = "review, hired or rejected"),
        ("search" = Option<String>, Query, description = "Search name, email and phone")
    ),
    responses(
        (status = 200, description = "Applications received through the caller's links", body = ApplicationListResponse)
    )
)]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.application_service.list(hr.user_id, query).await?;
    Ok(Json(ApplicationListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/hr/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application with current stage and editable fields", body = ApplicationDetailResponse),
        (status = 404, description = "Application not found")
    )
)]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get_owned(hr.user_id, id).await?;
    Ok(Json(ApplicationDetailResponse::from(application)))
}

#[utoipa::path(
    patch,
    path = "/api/hr/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationPayload,
    responses(
        (status = 200, description = "Application updated; notification outcome included", body = StatusUpdateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn update_application(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let now = now();
    let outcome = state
        .application_service
        .update_status(hr.user_id, id, payload.into_update(), now)
        .await?;

    // committed before dispatch: delivery failures never undo the update
    let mut notifications = DispatchReport::default();
    for transition in &outcome.transitions {
        let report = state
            .notification_service
            .dispatch_stage_transition(&outcome.application, transition, now)
            .await;
        notifications.extend(report);
    }

    Ok(Json(StatusUpdateResponse {
        application: outcome.application.into(),
        transitions: outcome.transitions,
        notifications,
    }))
}

#[utoipa::path(
    post,
    path = "/api/hr/applications/{id}/viewed",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application marked viewed", body = ApplicationDetailResponse),
        (status = 404, description = "Application not found")
    )
)]
pub async fn mark_application_viewed(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.mark_viewed(hr.user_id, id).await?;
    Ok(Json(ApplicationDetailResponse::from(application)))
}
