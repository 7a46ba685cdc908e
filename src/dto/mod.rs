pub mod application_dto;
pub mod cv_dto;
pub mod dashboard_dto;
pub mod job_dto;
pub mod link_dto;
