use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::detailed_application::{
    DetailedApplication, OverallStatus, Stage, StageStatus,
};
use crate::services::application_service::{
    ApplicantDetailsEdit, ApplicationList, ApplicationUpdate,
};
use crate::services::notification_service::DispatchReport;
use crate::services::stage_engine::{derive_stage, CurrentStage, StageTransition};
use crate::services::stage_gating::{field_editability, EditabilityMap, StageEdit, StageEdits};
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub job_id: Option<Uuid>,
    pub overall_status: Option<OverallStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StageView {
    pub stage: Stage,
    pub label: String,
    pub status: StageStatus,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub link_id: Uuid,
    pub job_id: Option<Uuid>,
    pub job_title: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub cover_letter: String,
    pub submitted_at: DateTime<Utc>,
    pub is_viewed: bool,
    pub interview_date: Option<DateTime<Utc>>,
    pub overall_status: OverallStatus,
    pub current_stage: CurrentStage,
    pub current_stage_number: u8,
    pub stages: Vec<StageView>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationResponse,
    pub editability: EditabilityMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// HR edit of an application. Absent fields keep their stored value; fields
/// the current stage has locked are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateApplicationPayload {
    #[validate(custom(function = "not_blank"), length(max = 150))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub cover_letter: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub phone_status: Option<StageStatus>,
    pub phone_comment: Option<String>,
    pub hr_status: Option<StageStatus>,
    pub hr_comment: Option<String>,
    pub technical_status: Option<StageStatus>,
    pub technical_comment: Option<String>,
    pub ceo_status: Option<StageStatus>,
    pub ceo_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusUpdateResponse {
    pub application: ApplicationDetailResponse,
    pub transitions: Vec<StageTransition>,
    pub notifications: DispatchReport,
}

impl UpdateApplicationPayload {
    pub fn into_update(self) -> ApplicationUpdate {
        ApplicationUpdate {
            details: ApplicantDetailsEdit {
                full_name: self.full_name,
                email: self.email,
                phone_number: self.phone_number,
                cover_letter: self.cover_letter,
            },
            interview_date: self.interview_date,
            stages: StageEdits {
                phone: StageEdit {
                    status: self.phone_status,
                    comment: self.phone_comment,
                },
                hr: StageEdit {
                    status: self.hr_status,
                    comment: self.hr_comment,
                },
                technical: StageEdit {
                    status: self.technical_status,
                    comment: self.technical_comment,
                },
                ceo: StageEdit {
                    status: self.ceo_status,
                    comment: self.ceo_comment,
                },
            },
        }
    }
}

impl From<DetailedApplication> for ApplicationResponse {
    fn from(value: DetailedApplication) -> Self {
        let current_stage = derive_stage(&value.statuses, value.overall_status);
        let stages = value
            .statuses
            .iter()
            .map(|(stage, status)| StageView {
                stage,
                label: stage.label().to_string(),
                status,
                comment: value.comments.get(stage).to_string(),
            })
            .collect();

        Self {
            job_title: value.job_title_or_general().to_string(),
            id: value.id,
            link_id: value.link_id,
            job_id: value.job_id,
            full_name: value.full_name,
            email: value.email,
            phone_number: value.phone_number,
            cover_letter: value.cover_letter,
            submitted_at: value.submitted_at,
            is_viewed: value.is_viewed,
            interview_date: value.interview_date,
            overall_status: value.overall_status,
            current_stage,
            current_stage_number: current_stage.number(),
            stages,
            updated_at: value.updated_at,
        }
    }
}

impl From<DetailedApplication> for ApplicationDetailResponse {
    fn from(value: DetailedApplication) -> Self {
        let editability = field_editability(&value.statuses, value.overall_status);
        Self {
            application: value.into(),
            editability,
        }
    }
}

impl From<ApplicationList> for ApplicationListResponse {
    fn from(value: ApplicationList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detailed_application::{StageComments, StageStatuses};

    fn application(statuses: StageStatuses, overall: OverallStatus) -> DetailedApplication {
        DetailedApplication {
            id: Uuid::new_v4(),
            link_id: Uuid::new_v4(),
            link_owner: Uuid::new_v4(),
            job_id: None,
            job_title: Some("Backend Engineer".into()),
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone_number: "+992900000000".into(),
            cover_letter: "Hello".into(),
            submitted_at: Utc::now(),
            is_viewed: false,
            interview_date: None,
            overall_status: overall,
            statuses,
            comments: StageComments::default(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn detail_reports_current_stage_and_editability() {
        use StageStatus::{Passed, Pending};
        let app = application(
            StageStatuses::new(Passed, Pending, Pending, Pending),
            OverallStatus::Review,
        );
        let detail = ApplicationDetailResponse::from(app);
        assert_eq!(detail.application.current_stage, CurrentStage::Hr);
        assert_eq!(detail.application.current_stage_number, 2);
        assert!(detail.editability.is_stage_editable(Stage::Hr));
        assert!(!detail.editability.is_stage_editable(Stage::Phone));
        assert_eq!(detail.application.stages.len(), 4);
    }

    #[test]
    fn payload_maps_onto_stage_edits() {
        let payload = UpdateApplicationPayload {
            technical_status: Some(StageStatus::Failed),
            technical_comment: Some("Weak on concurrency".into()),
            ..Default::default()
        };
        let update = payload.into_update();
        assert_eq!(update.stages.technical.status, Some(StageStatus::Failed));
        assert_eq!(update.stages.phone, StageEdit::default());
        assert!(update.details.full_name.is_none());
    }

    #[test]
    fn invalid_contact_details_fail_validation() {
        let payload = UpdateApplicationPayload {
            email: Some("nope".into()),
            phone_number: Some(String::new()),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn whitespace_only_details_are_rejected() {
        let payload = UpdateApplicationPayload {
            full_name: Some("   ".into()),
            cover_letter: Some("\n\t ".into()),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["full_name"][0].code, "blank");
        assert_eq!(fields["cover_letter"][0].code, "blank");
        assert!(!fields.contains_key("phone_number"));
    }
}
