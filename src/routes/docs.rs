use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{
    application_dto::{
        ApplicationDetailResponse, ApplicationListResponse, ApplicationResponse, StageView,
        StatusUpdateResponse, UpdateApplicationPayload,
    },
    cv_dto::{CvSubmittedResponse, SubmissionListResponse, SubmissionResponse},
    dashboard_dto::DashboardResponse,
    job_dto::{
        CreateJobPayload, JobListResponse, JobResponse, PublicJobListResponse, PublicJobResponse,
        UpdateJobPayload,
    },
    link_dto::{
        ApplicationFormPayload, ApplicationSubmittedResponse, CreateLinkPayload,
        LinkFormResponse, LinkResponse,
    },
};
use crate::models::{
    application_link::LinkState,
    cv_submission::DepartmentCount,
    detailed_application::{OverallStatus, OverallStatusCount, Stage, StageStatus},
    job::JobActivity,
};
use crate::services::{
    notification_service::{Audience, DispatchFailure, DispatchReport, SentMessage},
    stage_engine::{CurrentStage, StageTransition},
    stage_gating::{EditabilityMap, StageFieldAccess},
};

use super::{applications, apply, dashboard, jobs, links, submissions};

#[derive(OpenApi)]
#[openapi(
    paths(
        jobs::list_public_jobs,
        jobs::get_public_job,
        submissions::submit_job_cv,
        submissions::submit_general_cv,
        apply::get_application_form,
        apply::submit_application,
        dashboard::dashboard,
        jobs::list_jobs,
        jobs::create_job,
        jobs::get_job,
        jobs::update_job,
        jobs::delete_job,
        jobs::toggle_job_status,
        submissions::list_submissions,
        submissions::list_job_submissions,
        submissions::mark_submission_viewed,
        submissions::download_submission_cv,
        links::create_link,
        links::list_links,
        applications::list_applications,
        applications::get_application,
        applications::update_application,
        applications::mark_application_viewed,
    ),
    components(schemas(
        CreateJobPayload,
        UpdateJobPayload,
        JobResponse,
        JobListResponse,
        PublicJobResponse,
        PublicJobListResponse,
        CvSubmittedResponse,
        SubmissionResponse,
        SubmissionListResponse,
        CreateLinkPayload,
        LinkResponse,
        LinkState,
        LinkFormResponse,
        ApplicationFormPayload,
        ApplicationSubmittedResponse,
        ApplicationResponse,
        ApplicationDetailResponse,
        ApplicationListResponse,
        UpdateApplicationPayload,
        StatusUpdateResponse,
        StageView,
        Stage,
        StageStatus,
        OverallStatus,
        CurrentStage,
        StageTransition,
        EditabilityMap,
        StageFieldAccess,
        DispatchReport,
        SentMessage,
        DispatchFailure,
        Audience,
        DashboardResponse,
        JobActivity,
        DepartmentCount,
        OverallStatusCount,
    )),
    tags(
        (name = "recruitment-pipeline", description = "Job postings, CV intake, application links and interview pipeline")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
