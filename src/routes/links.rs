use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::link_dto::{CreateLinkPayload, LinkResponse},
    error::Result,
    middleware::auth::HrIdentity,
    utils::time::now,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/hr/links",
    request_body = CreateLinkPayload,
    responses(
        (status = 201, description = "Link issued", body = LinkResponse),
        (status = 400, description = "Invalid duration"),
        (status = 404, description = "Job not found")
    )
)]
pub async fn create_link(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Json(payload): Json<CreateLinkPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let issued_at = now();
    let link = state
        .link_service
        .create(hr.user_id, payload.job_id, payload.duration_days, issued_at)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::new(link, &state.config.public_base_url, issued_at)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/hr/links",
    responses(
        (status = 200, description = "Links issued by the caller", body = [LinkResponse])
    )
)]
pub async fn list_links(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
) -> Result<impl IntoResponse> {
    let at = now();
    let links = state.link_service.list(hr.user_id).await?;
    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| LinkResponse::new(link, &state.config.public_base_url, at))
        .collect();
    Ok(Json(items))
}
