mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use common::{bearer, db_state, multipart_body, multipart_content_type, RecordingMailer};
use recruitment_pipeline::{
    dto::{
        job_dto::CreateJobPayload, link_dto::ApplicationFormPayload,
    },
    error::Error,
    models::detailed_application::{OverallStatus, Stage, StageStatus, StageStatuses},
    routes::app,
    services::{
        application_service::ApplicationUpdate,
        stage_engine::{derive_stage, CurrentStage},
        stage_gating::StageEdit,
    },
    utils::pagination::MAX_PAGE,
    AppState,
};

fn form(name: &str) -> ApplicationFormPayload {
    ApplicationFormPayload {
        full_name: name.into(),
        email: "jane@example.com".into(),
        phone_number: "+992900000000".into(),
        cover_letter: "I would like to join the team.".into(),
    }
}

async fn seed_job(state: &AppState, owner: Uuid) -> Uuid {
    state
        .job_service
        .create(
            owner,
            CreateJobPayload {
                title: "Backend Engineer".into(),
                department: "it".into(),
                description: "Build the hiring platform".into(),
                requirements: "Rust, PostgreSQL".into(),
                location: "Dushanbe".into(),
                is_active: None,
            },
        )
        .await
        .expect("create job")
        .id
}

async fn application_count(state: &AppState, link_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM detailed_applications WHERE link_id = $1")
        .bind(link_id)
        .fetch_one(&state.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn link_expires_after_its_window() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let job_id = seed_job(&state, owner).await;
    let t0 = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

    let link = state
        .link_service
        .create(owner, Some(job_id), Some(7), t0)
        .await
        .unwrap();
    assert_eq!(link.expires_at, t0 + Duration::days(7));

    let late = state
        .link_service
        .redeem(link.token, form("Late Applicant"), t0 + Duration::days(8))
        .await;
    assert!(matches!(late, Err(Error::LinkExpired)));
    assert_eq!(application_count(&state, link.id).await, 0);

    let application = state
        .link_service
        .redeem(link.token, form("Jane Doe"), t0 + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(application.job_id, Some(job_id));
    assert_eq!(application.overall_status, OverallStatus::Review);
    assert_eq!(application_count(&state, link.id).await, 1);

    let is_used: bool = sqlx::query_scalar("SELECT is_used FROM application_links WHERE id = $1")
        .bind(link.id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert!(is_used);

    let again = state
        .link_service
        .redeem(link.token, form("Jane Doe"), t0 + Duration::days(2))
        .await;
    assert!(matches!(again, Err(Error::LinkAlreadyUsed)));
}

#[tokio::test]
async fn concurrent_redemptions_create_one_application() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let now = Utc::now();
    let link = state.link_service.create(owner, None, None, now).await.unwrap();

    let (first, second) = tokio::join!(
        state.link_service.redeem(link.token, form("First"), now),
        state.link_service.redeem(link.token, form("Second"), now),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(Error::LinkAlreadyUsed)))
            .count(),
        1
    );
    assert_eq!(application_count(&state, link.id).await, 1);
}

#[tokio::test]
async fn link_for_someone_elses_job_is_not_found() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let job_id = seed_job(&state, Uuid::new_v4()).await;
    let result = state
        .link_service
        .create(Uuid::new_v4(), Some(job_id), None, Utc::now())
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn stage_updates_report_transitions_once() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let now = Utc::now();
    let link = state.link_service.create(owner, None, None, now).await.unwrap();
    let application = state
        .link_service
        .redeem(link.token, form("Jane Doe"), now)
        .await
        .unwrap();

    let phone_passed = || {
        let mut update = ApplicationUpdate::default();
        update.stages.phone = StageEdit {
            status: Some(StageStatus::Passed),
            comment: Some("  Clear communicator ".into()),
        };
        update
    };

    let outcome = state
        .application_service
        .update_status(owner, application.id, phone_passed(), Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome.transitions.len(), 1);
    assert_eq!(outcome.transitions[0].stage, Stage::Phone);
    assert_eq!(outcome.application.comments.phone, "Clear communicator");
    assert_eq!(
        derive_stage(&outcome.application.statuses, outcome.application.overall_status),
        CurrentStage::Hr
    );

    let repeat = state
        .application_service
        .update_status(owner, application.id, phone_passed(), Utc::now())
        .await
        .unwrap();
    assert!(repeat.transitions.is_empty());

    let mut hr_failed = ApplicationUpdate::default();
    hr_failed.stages.hr.status = Some(StageStatus::Failed);
    let rejected = state
        .application_service
        .update_status(owner, application.id, hr_failed, Utc::now())
        .await
        .unwrap();
    assert_eq!(rejected.application.overall_status, OverallStatus::Rejected);
    assert_eq!(
        derive_stage(&rejected.application.statuses, rejected.application.overall_status),
        CurrentStage::Completed
    );
    assert_eq!(rejected.application.statuses.technical, StageStatus::Pending);

    let foreign = state
        .application_service
        .get_owned(Uuid::new_v4(), application.id)
        .await;
    assert!(matches!(foreign, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn referenced_job_cannot_be_deleted() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let job_id = seed_job(&state, owner).await;
    state
        .link_service
        .create(owner, Some(job_id), None, Utc::now())
        .await
        .unwrap();

    let result = state.job_service.delete(owner, job_id).await;
    assert!(matches!(result, Err(Error::Conflict(_))));

    let free_job = seed_job(&state, owner).await;
    state.job_service.delete(owner, free_job).await.unwrap();
}

#[tokio::test]
async fn phone_pass_over_http_notifies_only_the_applicant() {
    let mailer = RecordingMailer::default();
    let Some(state) = db_state(mailer.clone()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let auth = bearer(&owner.to_string(), Some("hr"), 3600);
    let router = app(state.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/hr/links")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "duration_days": 3 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let link: JsonValue =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    let token = link["token"].as_str().unwrap().to_string();
    assert!(link["url"].as_str().unwrap().ends_with(&format!("/apply/{}", token)));

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/apply/{}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "full_name": "Jane Doe",
                        "email": "jane@example.com",
                        "phone_number": "+992900000000",
                        "cover_letter": "Hello",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let submitted: JsonValue =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    let application_id = submitted["id"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(
            Request::get(format!("/api/apply/{}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let before = mailer.messages().len();
    let response = router
        .oneshot(
            Request::patch(format!("/api/hr/applications/{}", application_id))
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "phone_status": "passed" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: JsonValue =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();

    assert_eq!(body["application"]["application"]["current_stage_number"], 2);
    assert_eq!(body["notifications"]["sent"].as_array().unwrap().len(), 1);
    assert_eq!(body["notifications"]["sent"][0]["audience"], "applicant");

    let sent = mailer.messages();
    assert_eq!(sent.len() - before, 1);
    assert_eq!(sent.last().unwrap().recipients, vec!["jane@example.com".to_string()]);
}

#[tokio::test]
async fn link_state_is_checked_before_the_form() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let t0 = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    let link = state.link_service.create(owner, None, Some(1), t0).await.unwrap();

    let blank = || ApplicationFormPayload {
        full_name: "   ".into(),
        email: "jane@example.com".into(),
        phone_number: "  ".into(),
        cover_letter: "     ".into(),
    };

    let expired = state
        .link_service
        .redeem(link.token, blank(), t0 + Duration::days(2))
        .await;
    assert!(matches!(expired, Err(Error::LinkExpired)));

    let invalid = state.link_service.redeem(link.token, blank(), t0).await;
    assert!(matches!(invalid, Err(Error::Validation(_))));
    assert_eq!(application_count(&state, link.id).await, 0);

    let application = state
        .link_service
        .redeem(link.token, form("Jane Doe"), t0)
        .await
        .unwrap();
    assert_eq!(application.statuses, StageStatuses::default());
    assert_eq!(application.overall_status, OverallStatus::Review);

    let used = state.link_service.redeem(link.token, blank(), t0).await;
    assert!(matches!(used, Err(Error::LinkAlreadyUsed)));
}

#[tokio::test]
async fn huge_page_returns_an_empty_capped_page() {
    let Some(state) = db_state(RecordingMailer::default()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let auth = bearer(&Uuid::new_v4().to_string(), Some("hr"), 3600);
    for path in ["/api/hr/applications", "/api/hr/jobs", "/api/hr/submissions"] {
        let response = app(state.clone())
            .oneshot(
                Request::get(format!("{}?page={}&per_page=100", path, i64::MAX))
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
        let body: JsonValue =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap())
                .unwrap();
        assert_eq!(body["page"], MAX_PAGE, "{}", path);
        assert!(body["items"].as_array().unwrap().is_empty(), "{}", path);
    }
}

fn cv_upload(department: &str) -> Vec<u8> {
    multipart_body(
        &[
            ("applicant_name", "Jane Doe"),
            ("applicant_email", "jane@example.com"),
            ("department", department),
        ],
        Some(("Jane Doe CV.pdf", "application/pdf", b"%PDF-1.7 resume")),
    )
}

#[tokio::test]
async fn cv_upload_for_a_job_is_stored_and_acknowledged() {
    let mailer = RecordingMailer::default();
    let Some(state) = db_state(mailer.clone()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let owner = Uuid::new_v4();
    let job_id = seed_job(&state, owner).await;
    let router = app(state.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/public/jobs/{}/cv", job_id))
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(cv_upload("  human RESOURCES ")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: JsonValue =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["job_title"], "Backend Engineer");
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let stored = state.cv_service.get_visible(owner, id).await.unwrap();
    assert_eq!(stored.department, "Human Resources");
    assert_eq!(stored.cv_content_type, "application/pdf");
    assert_eq!(
        state.storage.open(&stored.cv_path).await.unwrap(),
        b"%PDF-1.7 resume"
    );

    let sent = mailer.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New CV Submission for Backend Engineer");
    assert_eq!(
        sent[0].recipients,
        vec!["hr@example.com".to_string(), "jane@example.com".to_string()]
    );
    let attachment = sent[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.content_type, "application/pdf");
    assert_eq!(attachment.data, b"%PDF-1.7 resume");

    state.job_service.toggle_active(owner, job_id).await.unwrap();
    let response = router
        .oneshot(
            Request::post(format!("/api/public/jobs/{}/cv", job_id))
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(cv_upload("it")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(mailer.messages().len(), 1);
}

#[tokio::test]
async fn general_cv_upload_normalizes_the_department() {
    let mailer = RecordingMailer::default();
    let Some(state) = db_state(mailer.clone()).await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let response = app(state.clone())
        .oneshot(
            Request::post("/api/public/cv")
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(cv_upload("iT")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: JsonValue =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["job_title"], "General Application");
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let department: String = sqlx::query_scalar("SELECT department FROM cv_submissions WHERE id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(department, "IT");
    assert_eq!(
        mailer.messages()[0].subject,
        "New CV Submission for General Application"
    );
}
