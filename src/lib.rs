pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    application_service::ApplicationService, cv_service::CvService, job_service::JobService,
    link_service::LinkService, mail_service::Mailer, notification_service::NotificationService,
    storage_service::CvStorage,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub job_service: JobService,
    pub cv_service: CvService,
    pub link_service: LinkService,
    pub application_service: ApplicationService,
    pub storage: CvStorage,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let job_service = JobService::new(pool.clone());
        let cv_service = CvService::new(pool.clone());
        let link_service = LinkService::new(pool.clone(), config.link_duration_days);
        let application_service = ApplicationService::new(pool.clone());
        let storage = CvStorage::new(&config.uploads_dir);
        let notification_service = NotificationService::new(
            mailer,
            config.mail_from.clone(),
            config.hr_notification_emails.clone(),
            config.interview_venue.clone(),
        );

        Self {
            pool,
            config: Arc::new(config),
            job_service,
            cv_service,
            link_service,
            application_service,
            storage,
            notification_service,
        }
    }
}
