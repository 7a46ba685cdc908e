use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::detailed_application::{OverallStatus, Stage, StageStatus, StageStatuses};

/// The derived position of an application in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CurrentStage {
    Phone,
    Hr,
    Technical,
    Ceo,
    Completed,
}

impl CurrentStage {
    /// 1 through 4 for the interview stages, 5 for completed.
    pub fn number(&self) -> u8 {
        match self {
            CurrentStage::Phone => 1,
            CurrentStage::Hr => 2,
            CurrentStage::Technical => 3,
            CurrentStage::Ceo => 4,
            CurrentStage::Completed => 5,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            CurrentStage::Phone => Some(Stage::Phone),
            CurrentStage::Hr => Some(Stage::Hr),
            CurrentStage::Technical => Some(Stage::Technical),
            CurrentStage::Ceo => Some(Stage::Ceo),
            CurrentStage::Completed => None,
        }
    }
}

pub fn derive_stage(statuses: &StageStatuses, overall: OverallStatus) -> CurrentStage {
    use StageStatus::{Passed, Pending};

    if overall != OverallStatus::Review {
        return CurrentStage::Completed;
    }
    if statuses.phone == Pending {
        return CurrentStage::Phone;
    }
    if statuses.phone == Passed && statuses.hr == Pending {
        return CurrentStage::Hr;
    }
    if statuses.hr == Passed && statuses.technical == Pending {
        return CurrentStage::Technical;
    }
    if statuses.technical == Passed && statuses.ceo == Pending {
        return CurrentStage::Ceo;
    }
    CurrentStage::Completed
}

/// The only place the overall status is computed. A CEO pass hires; any
/// failure anywhere rejects, even when later stages are still pending.
pub fn recompute_overall(statuses: &StageStatuses) -> OverallStatus {
    if statuses.ceo == StageStatus::Passed {
        OverallStatus::Hired
    } else if statuses.iter().any(|(_, status)| status == StageStatus::Failed) {
        OverallStatus::Rejected
    } else {
        OverallStatus::Review
    }
}

/// A stage that left `pending` during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StageTransition {
    pub stage: Stage,
    pub from: StageStatus,
    pub to: StageStatus,
}

/// Only pending -> passed/failed counts; moves between decided values and
/// unchanged stages are not transitions.
pub fn detect_transitions(old: &StageStatuses, new: &StageStatuses) -> Vec<StageTransition> {
    Stage::ALL
        .into_iter()
        .filter_map(|stage| {
            let from = old.get(stage);
            let to = new.get(stage);
            (from.is_pending() && !to.is_pending()).then_some(StageTransition { stage, from, to })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageStatus::{Failed, Passed, Pending};

    fn s(phone: StageStatus, hr: StageStatus, technical: StageStatus, ceo: StageStatus) -> StageStatuses {
        StageStatuses::new(phone, hr, technical, ceo)
    }

    fn every_combination() -> Vec<StageStatuses> {
        let mut out = Vec::with_capacity(81);
        for phone in StageStatus::ALL {
            for hr in StageStatus::ALL {
                for technical in StageStatus::ALL {
                    for ceo in StageStatus::ALL {
                        out.push(s(phone, hr, technical, ceo));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn fresh_application_starts_at_phone() {
        let statuses = StageStatuses::default();
        assert_eq!(derive_stage(&statuses, OverallStatus::Review), CurrentStage::Phone);
        assert_eq!(recompute_overall(&statuses), OverallStatus::Review);
    }

    #[test]
    fn stages_advance_one_pass_at_a_time() {
        let review = OverallStatus::Review;
        assert_eq!(derive_stage(&s(Passed, Pending, Pending, Pending), review).number(), 2);
        assert_eq!(derive_stage(&s(Passed, Passed, Pending, Pending), review).number(), 3);
        assert_eq!(derive_stage(&s(Passed, Passed, Passed, Pending), review).number(), 4);
        assert_eq!(derive_stage(&s(Passed, Passed, Passed, Passed), review).number(), 5);
    }

    #[test]
    fn closed_applications_are_always_completed() {
        for statuses in every_combination() {
            assert_eq!(derive_stage(&statuses, OverallStatus::Hired), CurrentStage::Completed);
            assert_eq!(derive_stage(&statuses, OverallStatus::Rejected), CurrentStage::Completed);
        }
    }

    #[test]
    fn pending_phone_wins_over_later_stage_values() {
        for statuses in every_combination().into_iter().filter(|st| st.phone == Pending) {
            assert_eq!(derive_stage(&statuses, OverallStatus::Review), CurrentStage::Phone);
        }
    }

    #[test]
    fn failure_does_not_move_the_derived_stage_by_itself() {
        // phone failed, hr pending: no rule matches, so the stage reads completed
        assert_eq!(
            derive_stage(&s(Failed, Pending, Pending, Pending), OverallStatus::Review),
            CurrentStage::Completed
        );
        // hr failed, technical pending: rule for technical needs hr passed
        assert_eq!(
            derive_stage(&s(Passed, Failed, Pending, Pending), OverallStatus::Review),
            CurrentStage::Completed
        );
    }

    #[test]
    fn ceo_pass_hires_regardless_of_other_stages() {
        for statuses in every_combination().into_iter().filter(|st| st.ceo == Passed) {
            assert_eq!(recompute_overall(&statuses), OverallStatus::Hired);
        }
    }

    #[test]
    fn any_failure_without_ceo_pass_rejects() {
        for statuses in every_combination()
            .into_iter()
            .filter(|st| st.ceo != Passed && st.iter().any(|(_, v)| v == Failed))
        {
            assert_eq!(recompute_overall(&statuses), OverallStatus::Rejected);
        }
    }

    #[test]
    fn no_failure_and_no_ceo_pass_stays_in_review() {
        for statuses in every_combination()
            .into_iter()
            .filter(|st| st.ceo != Passed && st.iter().all(|(_, v)| v != Failed))
        {
            assert_eq!(recompute_overall(&statuses), OverallStatus::Review);
        }
    }

    #[test]
    fn early_phone_failure_short_circuits_to_rejected() {
        assert_eq!(
            recompute_overall(&s(Failed, Pending, Pending, Pending)),
            OverallStatus::Rejected
        );
    }

    #[test]
    fn technical_failure_rejects_and_completes() {
        let statuses = s(Passed, Passed, Failed, Pending);
        let overall = recompute_overall(&statuses);
        assert_eq!(overall, OverallStatus::Rejected);
        assert_eq!(derive_stage(&statuses, overall).number(), 5);
    }

    #[test]
    fn unchanged_statuses_produce_no_transitions() {
        for statuses in every_combination() {
            assert!(detect_transitions(&statuses, &statuses).is_empty());
        }
    }

    #[test]
    fn leaving_pending_is_a_transition() {
        let old = s(Pending, Pending, Pending, Pending);
        let new = s(Passed, Pending, Pending, Pending);
        assert_eq!(
            detect_transitions(&old, &new),
            vec![StageTransition {
                stage: Stage::Phone,
                from: Pending,
                to: Passed
            }]
        );
    }

    #[test]
    fn moves_between_decided_values_are_ignored() {
        let old = s(Passed, Failed, Pending, Pending);
        let new = s(Failed, Passed, Pending, Pending);
        assert!(detect_transitions(&old, &new).is_empty());
    }

    #[test]
    fn returning_to_pending_is_not_a_transition() {
        let old = s(Passed, Pending, Pending, Pending);
        let new = s(Pending, Pending, Pending, Pending);
        assert!(detect_transitions(&old, &new).is_empty());
    }
}
