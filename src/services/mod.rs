pub mod application_service;
pub mod cv_service;
pub mod job_service;
pub mod link_service;
pub mod mail_service;
pub mod notification_service;
pub mod stage_engine;
pub mod stage_gating;
pub mod storage_service;
