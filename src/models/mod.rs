pub mod application_link;
pub mod cv_submission;
pub mod detailed_application;
pub mod job;
