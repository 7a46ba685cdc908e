pub mod applications;
pub mod apply;
pub mod dashboard;
pub mod docs;
pub mod health;
pub mod jobs;
pub mod links;
pub mod submissions;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::require_hr,
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Upper bound for any request body, CV uploads included.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/api/public/jobs", get(jobs::list_public_jobs))
        .route("/api/public/jobs/:id", get(jobs::get_public_job))
        .route("/api/public/jobs/:id/cv", post(submissions::submit_job_cv))
        .route("/api/public/cv", post(submissions::submit_general_cv))
        .route(
            "/api/apply/:token",
            get(apply::get_application_form).post(apply::submit_application),
        )
        .layer(from_fn_with_state(
            RateLimiter::new(state.config.public_rps),
            rps_middleware,
        ));

    let hr_api = Router::new()
        .route("/api/hr/dashboard", get(dashboard::dashboard))
        .route("/api/hr/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/api/hr/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route(
            "/api/hr/jobs/:id/toggle-status",
            post(jobs::toggle_job_status),
        )
        .route(
            "/api/hr/jobs/:id/submissions",
            get(submissions::list_job_submissions),
        )
        .route("/api/hr/submissions", get(submissions::list_submissions))
        .route(
            "/api/hr/submissions/:id/viewed",
            post(submissions::mark_submission_viewed),
        )
        .route(
            "/api/hr/submissions/:id/cv",
            get(submissions::download_submission_cv),
        )
        .route("/api/hr/links", get(links::list_links).post(links::create_link))
        .route(
            "/api/hr/applications",
            get(applications::list_applications),
        )
        .route(
            "/api/hr/applications/:id",
            get(applications::get_application).patch(applications::update_application),
        )
        .route(
            "/api/hr/applications/:id/viewed",
            post(applications::mark_application_viewed),
        )
        .layer(from_fn_with_state(state.clone(), require_hr))
        .layer(from_fn_with_state(
            RateLimiter::new(state.config.hr_rps),
            rps_middleware,
        ));

    let cors = cors_layer(&state.config.public_base_url);

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(public_api)
        .merge(hr_api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
