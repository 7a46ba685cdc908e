use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::cv_dto::{
        CvSubmissionForm, CvSubmittedResponse, SubmissionListQuery, SubmissionListResponse,
        SubmissionResponse,
    },
    error::{Error, Result},
    middleware::auth::HrIdentity,
    services::{cv_service::NewCvSubmission, mail_service::MailAttachment},
    AppState,
};

struct CvUpload {
    form: CvSubmissionForm,
    filename: String,
    data: Bytes,
}

async fn read_cv_upload(mut multipart: Multipart) -> Result<CvUpload> {
    let mut form = CvSubmissionForm::default();
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "applicant_name" => form.applicant_name = field.text().await?.trim().to_string(),
            "applicant_email" => form.applicant_email = field.text().await?.trim().to_string(),
            "department" => form.department = field.text().await?.trim().to_string(),
            "cv_file" => {
                let filename = field.file_name().unwrap_or("cv").to_string();
                let data = field.bytes().await?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    form.validate()?;
    let (filename, data) =
        file.ok_or_else(|| Error::BadRequest("cv_file is required".into()))?;
    Ok(CvUpload {
        form,
        filename,
        data,
    })
}

async fn accept_cv(
    state: &AppState,
    job_id: Option<Uuid>,
    upload: CvUpload,
) -> Result<(StatusCode, Json<CvSubmittedResponse>)> {
    if let Some(job_id) = job_id {
        state.job_service.get_active(job_id).await?;
    }

    let stored = state.storage.save(&upload.filename, &upload.data).await?;
    let stored_path = stored.path.clone();
    let submission = match state
        .cv_service
        .create(NewCvSubmission {
            job_id,
            applicant_name: upload.form.applicant_name,
            applicant_email: upload.form.applicant_email,
            department: upload.form.department,
            file: stored,
        })
        .await
    {
        Ok(submission) => submission,
        Err(err) => {
            state.storage.discard(&stored_path).await;
            return Err(err);
        }
    };

    let attachment = MailAttachment {
        filename: submission.cv_filename.clone(),
        content_type: submission.cv_content_type.clone(),
        data: upload.data.to_vec(),
    };
    state
        .notification_service
        .notify_cv_submitted(&submission, Some(attachment))
        .await;

    Ok((StatusCode::CREATED, Json(CvSubmittedResponse::from(&submission))))
}

#[utoipa::path(
    post,
    path = "/api/public/jobs/{id}/cv",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 201, description = "CV received", body = CvSubmittedResponse),
        (status = 400, description = "Invalid form or file"),
        (status = 404, description = "Job not found or inactive")
    )
)]
pub async fn submit_job_cv(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_cv_upload(multipart).await?;
    accept_cv(&state, Some(job_id), upload).await
}

#[utoipa::path(
    post,
    path = "/api/public/cv",
    responses(
        (status = 201, description = "CV received", body = CvSubmittedResponse),
        (status = 400, description = "Invalid form or file")
    )
)]
pub async fn submit_general_cv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_cv_upload(multipart).await?;
    accept_cv(&state, None, upload).await
}

#[utoipa::path(
    get,
    path = "/api/hr/submissions",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("job_id" = Option<Uuid>, Query, description = "Filter by job"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("is_viewed" = Option<bool>, Query, description = "Filter by viewed flag"),
        ("search" = Option<String>, Query, description = "Search applicant name and email")
    ),
    responses(
        (status = 200, description = "Submissions visible to the caller", body = SubmissionListResponse)
    )
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.cv_service.list(hr.user_id, query).await?;
    Ok(Json(SubmissionListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/hr/jobs/{id}/submissions",
    params(
        ("id" = Uuid, Path, description = "Job ID"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("is_viewed" = Option<bool>, Query, description = "Filter by viewed flag"),
        ("search" = Option<String>, Query, description = "Search applicant name and email")
    ),
    responses(
        (status = 200, description = "Submissions for the job", body = SubmissionListResponse),
        (status = 404, description = "Job not found")
    )
)]
pub async fn list_job_submissions(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(job_id): Path<Uuid>,
    Query(mut query): Query<SubmissionListQuery>,
) -> Result<impl IntoResponse> {
    state.job_service.get_owned(hr.user_id, job_id).await?;
    query.job_id = Some(job_id);
    let result = state.cv_service.list(hr.user_id, query).await?;
    Ok(Json(SubmissionListResponse::from(result)))
}

#[utoipa::path(
    post,
    path = "/api/hr/submissions/{id}/viewed",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission marked viewed", body = SubmissionResponse),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn mark_submission_viewed(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let submission = state.cv_service.mark_viewed(hr.user_id, id).await?;
    Ok(Json(SubmissionResponse::from(submission)))
}

#[utoipa::path(
    get,
    path = "/api/hr/submissions/{id}/cv",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "The uploaded CV file"),
        (status = 404, description = "Submission or file not found")
    )
)]
pub async fn download_submission_cv(
    State(state): State<AppState>,
    Extension(hr): Extension<HrIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let submission = state.cv_service.get_visible(hr.user_id, id).await?;
    let data = state.storage.open(&submission.cv_path).await?;

    let ascii_name: String = submission
        .cv_filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    let headers = [
        (header::CONTENT_TYPE, submission.cv_content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", ascii_name),
        ),
    ];
    Ok((headers, data))
}
