use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::link_dto::{ApplicationFormPayload, ApplicationSubmittedResponse, LinkFormResponse},
    error::Result,
    services::link_service::parse_token,
    utils::time::now,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/apply/{token}",
    params(("token" = String, Path, description = "Application link token")),
    responses(
        (status = 200, description = "Link is active", body = LinkFormResponse),
        (status = 404, description = "link_invalid"),
        (status = 409, description = "link_already_used"),
        (status = 410, description = "link_expired")
    )
)]
pub async fn get_application_form(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let token = parse_token(&token)?;
    let form = state.link_service.inspect(token, now()).await?;
    Ok(Json(LinkFormResponse::from(form)))
}

#[utoipa::path(
    post,
    path = "/api/apply/{token}",
    params(("token" = String, Path, description = "Application link token")),
    request_body = ApplicationFormPayload,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationSubmittedResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "link_invalid"),
        (status = 409, description = "link_already_used"),
        (status = 410, description = "link_expired")
    )
)]
pub async fn submit_application(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ApplicationFormPayload>,
) -> Result<impl IntoResponse> {
    let token = parse_token(&token)?;
    let application = state.link_service.redeem(token, payload, now()).await?;

    state
        .notification_service
        .notify_application_received(&application)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationSubmittedResponse::from(&application)),
    ))
}
