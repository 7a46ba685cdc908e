use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::models::detailed_application::{
    OverallStatus, Stage, StageComments, StageStatus, StageStatuses,
};
use crate::services::stage_engine::derive_stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StageFieldAccess {
    pub stage: Stage,
    pub editable: bool,
    pub status_choices: Vec<StageStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EditabilityMap {
    pub applicant_details: bool,
    pub interview_date: bool,
    pub stages: Vec<StageFieldAccess>,
}

impl EditabilityMap {
    pub fn stage(&self, stage: Stage) -> Option<&StageFieldAccess> {
        self.stages.iter().find(|access| access.stage == stage)
    }

    pub fn is_stage_editable(&self, stage: Stage) -> bool {
        self.stage(stage).is_some_and(|access| access.editable)
    }
}

/// Advisory for clients; [`apply_stage_edits`] enforces the same map.
pub fn field_editability(statuses: &StageStatuses, overall: OverallStatus) -> EditabilityMap {
    let open = overall == OverallStatus::Review;
    let active = derive_stage(statuses, overall).stage().filter(|_| open);

    let stages = Stage::ALL
        .into_iter()
        .map(|stage| {
            let is_active = active == Some(stage);
            let status_choices = if is_active {
                vec![StageStatus::Passed, StageStatus::Failed]
            } else {
                StageStatus::ALL.to_vec()
            };
            StageFieldAccess {
                stage,
                editable: is_active,
                status_choices,
            }
        })
        .collect();

    EditabilityMap {
        applicant_details: open,
        interview_date: open,
        stages,
    }
}

/// Requested change to one stage. `None` leaves the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageEdit {
    pub status: Option<StageStatus>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageEdits {
    pub phone: StageEdit,
    pub hr: StageEdit,
    pub technical: StageEdit,
    pub ceo: StageEdit,
}

impl StageEdits {
    pub fn get(&self, stage: Stage) -> &StageEdit {
        match stage {
            Stage::Phone => &self.phone,
            Stage::Hr => &self.hr,
            Stage::Technical => &self.technical,
            Stage::Ceo => &self.ceo,
        }
    }
}

/// Merges `edits` into the stored stage fields, honouring the editability
/// derived from the stored state. Edits to locked stages are ignored.
pub fn apply_stage_edits(
    statuses: &StageStatuses,
    comments: &StageComments,
    overall: OverallStatus,
    edits: &StageEdits,
) -> Result<(StageStatuses, StageComments), ValidationErrors> {
    let access = field_editability(statuses, overall);
    let mut next_statuses = *statuses;
    let mut next_comments = comments.clone();
    let mut errors = ValidationErrors::new();

    for stage in Stage::ALL {
        if !access.is_stage_editable(stage) {
            continue;
        }
        let edit = edits.get(stage);
        if let Some(status) = edit.status {
            if status.is_pending() {
                let mut err = ValidationError::new("pending_not_allowed");
                err.message = Some(
                    format!("{} must be marked passed or failed", stage.label()).into(),
                );
                errors.add(stage.status_field(), err);
            } else {
                next_statuses.set(stage, status);
            }
        }
        if let Some(comment) = &edit.comment {
            next_comments.set(stage, comment.trim().to_string());
        }
    }

    if errors.is_empty() {
        Ok((next_statuses, next_comments))
    } else {
        Err(errors)
    }
}
