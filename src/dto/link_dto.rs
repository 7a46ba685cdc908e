use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::job_dto::PublicJobResponse;
use crate::models::application_link::{ApplicationLink, LinkState};
use crate::models::detailed_application::{DetailedApplication, GENERAL_APPLICATION};
use crate::services::link_service::{apply_url, LinkForm};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLinkPayload {
    pub job_id: Option<Uuid>,
    #[validate(range(min = 1, max = 365))]
    pub duration_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkResponse {
    pub id: Uuid,
    pub token: Uuid,
    pub url: String,
    pub job_id: Option<Uuid>,
    pub job_title: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub state: LinkState,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn new(link: ApplicationLink, public_base_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            url: apply_url(public_base_url, link.token),
            state: link.state_at(now),
            id: link.id,
            token: link.token,
            job_id: link.job_id,
            job_title: link
                .job_title
                .unwrap_or_else(|| GENERAL_APPLICATION.to_string()),
            expires_at: link.expires_at,
            is_used: link.is_used,
            created_at: link.created_at,
        }
    }
}

/// Context for rendering the detailed application form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkFormResponse {
    pub job_title: String,
    pub job: Option<PublicJobResponse>,
    pub expires_at: DateTime<Utc>,
}

impl From<LinkForm> for LinkFormResponse {
    fn from(value: LinkForm) -> Self {
        Self {
            job_title: value
                .job
                .as_ref()
                .map(|job| job.title.clone())
                .unwrap_or_else(|| GENERAL_APPLICATION.to_string()),
            job: value.job.map(Into::into),
            expires_at: value.link.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplicationFormPayload {
    #[validate(custom(function = "not_blank"), length(max = 150))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "not_blank"), length(max = 20))]
    pub phone_number: String,
    #[validate(custom(function = "not_blank"))]
    pub cover_letter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationSubmittedResponse {
    pub id: Uuid,
    pub job_title: String,
    pub submitted_at: DateTime<Utc>,
    pub message: String,
}

impl From<&DetailedApplication> for ApplicationSubmittedResponse {
    fn from(value: &DetailedApplication) -> Self {
        Self {
            id: value.id,
            job_title: value.job_title_or_general().to_string(),
            submitted_at: value.submitted_at,
            message: "Your application has been submitted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn duration_outside_range_is_rejected() {
        for days in [0, 366] {
            let payload = CreateLinkPayload {
                job_id: None,
                duration_days: Some(days),
            };
            assert!(payload.validate().is_err(), "{} days accepted", days);
        }
        assert!(CreateLinkPayload::default().validate().is_ok());
    }

    #[test]
    fn form_fields_are_bounded() {
        let form = ApplicationFormPayload {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone_number: "+992 900 000 000 000 000".into(),
            cover_letter: String::new(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone_number"));
        assert!(fields.contains_key("cover_letter"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn whitespace_only_fields_are_blank() {
        let form = ApplicationFormPayload {
            full_name: "   ".into(),
            email: "jane@example.com".into(),
            phone_number: "  ".into(),
            cover_letter: "     ".into(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["full_name", "phone_number", "cover_letter"] {
            assert_eq!(fields[field][0].code, "blank", "{} accepted", field);
        }
    }

    #[test]
    fn response_carries_absolute_url_and_state() {
        let now = Utc::now();
        let link = ApplicationLink {
            id: Uuid::new_v4(),
            token: Uuid::new_v4(),
            job_id: None,
            job_title: None,
            expires_at: now + Duration::days(7),
            is_used: true,
            created_by: Uuid::new_v4(),
            created_at: now,
        };
        let token = link.token;
        let response = LinkResponse::new(link, "https://careers.example.com", now);
        assert_eq!(response.url, format!("https://careers.example.com/apply/{}", token));
        assert_eq!(response.state, LinkState::Redeemed);
        assert_eq!(response.job_title, "General Application");
    }
}
